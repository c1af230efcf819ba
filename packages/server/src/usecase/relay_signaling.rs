//! UseCase: シグナリングメッセージの中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelaySignalingUseCase::execute() の認可判定と `from` のスタンプ
//!
//! ### どのような状況を想定しているか
//! - 正常系：ビューア → ロボット、ロボット → ビューア、ビューア → 同室ビューア
//! - 異常系：別ルームへの送信、未知の宛先、`to` の欠落、Unbound からの送信

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{
    BrokerError, ConnectionId, MessagePusher, RelayRoute, SessionRepository, SignalingMessage,
};

/// シグナリング中継のユースケース
pub struct RelaySignalingUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalingUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 中継を認可し、`from` をスタンプしたメッセージと宛先を返す
    pub async fn execute(
        &self,
        caller: &ConnectionId,
        message: Value,
    ) -> Result<RelayRoute, BrokerError> {
        let message = SignalingMessage::from_value(message)?;
        self.repository.route_signaling(caller, message).await
    }

    /// 認可済みメッセージを宛先に送信
    ///
    /// 送信失敗は送信者には伝えません（宛先が切断した直後など）。
    pub async fn deliver(&self, receiver: &ConnectionId, content: &str) {
        if let Err(e) = self.message_pusher.push_to(receiver, content).await {
            tracing::warn!("Failed to relay signaling message to '{}': {}", receiver, e);
        }
    }
}
