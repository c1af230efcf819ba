//! トークン生成器の trait 定義

/// アクセストークン文字列の生成器
///
/// 推測困難な値を返すことが前提です。アルゴリズムは実装に任せます。
#[cfg_attr(test, mockall::automock)]
pub trait TokenGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}
