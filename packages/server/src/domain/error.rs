//! ドメインエラー定義

use thiserror::Error;

use super::value_object::ConnectionId;

/// ブローカーへのリクエストが拒否された理由
///
/// `Display` の文字列がそのままクライアントへのエラー応答になります。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// 必須フィールドの欠落、または不正な形式
    #[error("{0}")]
    Validation(String),

    /// 既にロールを持つ接続が再度ロールを得ようとした
    #[error("Connection \"{id}\" is already bound as a {role}")]
    AlreadyBound { id: ConnectionId, role: &'static str },

    /// ロボット専用の操作をロボット以外が呼んだ
    #[error("Robot not found")]
    NotARobot,

    /// ビューア専用の操作（移動・停止）をビューア以外が呼んだ
    #[error("You are not paired with any robot")]
    NotPaired,

    /// ロールを持たない接続からのシグナリング
    #[error("The connection seems not paired with any robot or peer")]
    Unpaired,

    #[error("No robot found for the given access token")]
    UnknownToken,

    /// 生成したトークンが別のロボットのトークンと衝突した
    #[error("Generated access token collides with an existing one")]
    TokenCollision,

    #[error("No receiver connection found for the id \"{0}\"")]
    UnknownReceiver(String),

    /// ペアリング先のロボットが既に切断している
    #[error("Robot \"{0}\" not found or active")]
    RobotGone(ConnectionId),

    /// 受信者が同じロボットのルームに属していない
    #[error("No viewers found for the receiver id \"{0}\"")]
    UnauthorizedReceiver(ConnectionId),

    /// ロボットのビューア上限に達している
    #[error("Robot \"{nickname}\" already has {limit} viewer(s)")]
    RobotFull { nickname: String, limit: usize },

    #[error("Connection \"{0}\" is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("Connection \"{0}\" is not registered")]
    UnknownConnection(ConnectionId),
}

/// メッセージ送信（プッシュ）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
