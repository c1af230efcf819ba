//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() と notify_viewer_added()
//! - 通知先がロボット → 既存ビューアの順になること
//!
//! ### どのような状況を想定しているか
//! - 正常系：最初のビューア、2 人目のビューア
//! - 異常系：未知のトークン、名前の欠落、上限到達

use std::sync::Arc;

use crate::domain::{BrokerError, ConnectionId, JoinedRoom, MessagePusher, SessionRepository};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// アクセストークンで参加
    pub async fn execute(
        &self,
        caller: &ConnectionId,
        access_token: Option<String>,
        name: Option<String>,
    ) -> Result<JoinedRoom, BrokerError> {
        let joined = self.repository.join_room(caller, access_token, name).await?;
        tracing::info!(
            "Viewer '{}' (\"{}\") joined robot '{}' with {} existing viewer(s)",
            joined.viewer.id,
            joined.viewer.name,
            joined.viewer.robot_id,
            joined.siblings.len()
        );
        Ok(joined)
    }

    /// ロボットと既存ビューアに新しいビューアを通知
    pub async fn notify_viewer_added(&self, joined: &JoinedRoom, content: &str) {
        if let Err(e) = self
            .message_pusher
            .broadcast(joined.notify_targets(), content)
            .await
        {
            tracing::warn!("Failed to notify viewer_add for '{}': {}", joined.viewer.id, e);
        }
    }
}
