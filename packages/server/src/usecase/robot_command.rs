//! UseCase: ロボットへの移動・停止コマンド転送
//!
//! コマンドの内容は検証せず、ペアになっているロボットへそのまま転送します。

use std::sync::Arc;

use crate::domain::{BrokerError, ConnectionId, MessagePusher, SessionRepository};

/// 移動・停止コマンド転送のユースケース
pub struct RobotCommandUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RobotCommandUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 呼び出し元ビューアのロボットへ `content` を送信
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionId)` - 送信先ロボット
    /// * `Err(BrokerError::NotPaired)` - 呼び出し元がビューアではない
    /// * `Err(BrokerError::RobotGone)` - ロボットが既に切断している
    pub async fn execute(
        &self,
        caller: &ConnectionId,
        content: &str,
    ) -> Result<ConnectionId, BrokerError> {
        let robot_id = self.repository.command_target(caller).await?;

        if let Err(e) = self.message_pusher.push_to(&robot_id, content).await {
            tracing::warn!("Failed to forward command to robot '{}': {}", robot_id, e);
            return Err(BrokerError::RobotGone(robot_id));
        }

        tracing::debug!("Forwarded command from '{}' to robot '{}'", caller, robot_id);
        Ok(robot_id)
    }
}
