//! UseCase 層のエラー定義

use thiserror::Error;

/// 接続受け付け時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Connection ID '{0}' is already registered")]
    DuplicateConnectionId(String),
}
