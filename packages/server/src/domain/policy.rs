//! セッションポリシー
//!
//! トークンの有効期間とロボットあたりのビューア数上限。

/// アクセストークンの有効期間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenPolicy {
    /// 発行元ロボットが接続している限り何度でも使える
    #[default]
    MultiUse,
    /// 最初の参加成功で失効する
    SingleUse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionPolicy {
    pub token_policy: TokenPolicy,
    /// `None` は無制限
    pub max_viewers_per_robot: Option<usize>,
}
