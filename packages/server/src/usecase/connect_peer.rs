//! UseCase: 接続受け付け処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectPeerUseCase::execute() メソッド
//! - 新しい接続が Unbound として登録され、送信チャンネルが MessagePusher に渡されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続
//! - 異常系：同じ接続 ID での二重登録

use std::sync::Arc;

use kakehashi_shared::time::Clock;

use crate::domain::{
    BrokerError, ConnectionId, MessagePushError, MessagePusher, PusherChannel,
    SessionRepository, Timestamp,
};

use super::error::ConnectError;

/// 接続受け付けのユースケース
pub struct ConnectPeerUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectPeerUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// 接続を登録
    ///
    /// # Returns
    ///
    /// * `Ok(Timestamp)` - 接続時刻
    /// * `Err(ConnectError)` - 同じ ID が既に登録済み
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<Timestamp, ConnectError> {
        let connected_at = Timestamp::new(self.clock.now_millis());

        // 1. Repository に Unbound として登録
        match self
            .repository
            .add_connection(connection_id.clone(), connected_at)
            .await
        {
            Ok(()) => {}
            Err(BrokerError::DuplicateConnection(id)) => {
                return Err(ConnectError::DuplicateConnectionId(id.into_string()));
            }
            Err(e) => {
                tracing::warn!("Unexpected error while registering connection: {}", e);
                return Err(ConnectError::DuplicateConnectionId(
                    connection_id.into_string(),
                ));
            }
        }

        // 2. MessagePusher に送信チャンネルを登録
        self.message_pusher
            .register_client(connection_id, sender)
            .await;

        Ok(connected_at)
    }

    /// 接続直後の `connected` メッセージを送る
    pub async fn greet(
        &self,
        connection_id: &ConnectionId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(connection_id, message).await
    }
}
