//! UseCase: 切断時の後始末
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectPeerUseCase::execute() の戻り値（Departure）と状態の変化
//! - broadcast_departure() が通知先に 1 回ずつ送信すること
//!
//! ### どのような状況を想定しているか
//! - ビューアの切断、ロボットの切断、Unbound の切断、二重の切断

use std::sync::Arc;

use crate::domain::{ConnectionId, Departure, MessagePusher, SessionRepository};

/// 切断処理のユースケース
pub struct DisconnectPeerUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectPeerUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続を取り除き、誰に何を通知すべきかを返す
    ///
    /// 同じ接続に対して 2 回呼ばれても 2 回目は `Departure::Unknown` を返すだけです。
    pub async fn execute(&self, connection_id: &ConnectionId) -> Departure {
        // 1. MessagePusher から登録解除
        self.message_pusher.unregister_client(connection_id).await;

        // 2. Repository から削除
        let departure = self.repository.remove_connection(connection_id).await;

        match &departure {
            Departure::Unknown => {
                tracing::debug!("Connection '{}' was already cleaned up", connection_id);
            }
            Departure::Unbound => {
                tracing::info!("Unbound connection '{}' disconnected", connection_id);
            }
            Departure::Viewer { viewer, .. } => {
                tracing::info!(
                    "Viewer '{}' (\"{}\") left robot '{}'",
                    viewer.id,
                    viewer.name,
                    viewer.robot_id
                );
            }
            Departure::Robot {
                nickname,
                viewers,
                revoked_tokens,
                ..
            } => {
                tracing::info!(
                    "Robot '{}' (\"{}\") disconnected. {} viewer(s) notified, {} access token(s) revoked",
                    connection_id,
                    nickname,
                    viewers.len(),
                    revoked_tokens
                );
            }
        }

        departure
    }

    /// 切断通知を送信
    pub async fn broadcast_departure(&self, targets: Vec<ConnectionId>, content: &str) {
        if targets.is_empty() {
            return;
        }
        if let Err(e) = self.message_pusher.broadcast(targets, content).await {
            tracing::warn!("Failed to broadcast departure: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Timestamp, message_pusher::MockMessagePusher},
        usecase::test_support::{create_test_repository, id, setup_room},
    };

    fn pusher_expecting_unregister(times: usize) -> MockMessagePusher {
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_unregister_client()
            .times(times)
            .returning(|_| ());
        pusher
    }

    #[tokio::test]
    async fn test_disconnect_viewer() {
        // テスト項目: ビューアの切断で、ロボットと残りのビューアが通知先になる
        // given (前提条件):
        let repository = create_test_repository();
        setup_room(&repository, &["v1", "v2", "v3"]).await;
        let usecase =
            DisconnectPeerUseCase::new(repository.clone(), Arc::new(pusher_expecting_unregister(1)));

        // when (操作):
        let departure = usecase.execute(&id("v2")).await;

        // then (期待する結果):
        assert_eq!(departure.notify_targets(), vec![id("r"), id("v1"), id("v3")]);
        let snapshot = repository.snapshot().await;
        let remaining: Vec<_> = snapshot.robots[0]
            .viewers
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(remaining, vec!["v1", "v3"]);
    }

    #[tokio::test]
    async fn test_disconnect_robot_revokes_tokens() {
        // テスト項目: ロボットの切断でビューアが通知先になり、トークンが失効する
        // given (前提条件):
        let repository = create_test_repository();
        setup_room(&repository, &["v1", "v2"]).await;
        let usecase =
            DisconnectPeerUseCase::new(repository.clone(), Arc::new(pusher_expecting_unregister(1)));

        // when (操作):
        let departure = usecase.execute(&id("r")).await;

        // then (期待する結果):
        match &departure {
            Departure::Robot {
                nickname,
                viewers,
                revoked_tokens,
                ..
            } => {
                assert_eq!(nickname, "R");
                assert_eq!(viewers, &vec![id("v1"), id("v2")]);
                assert_eq!(*revoked_tokens, 1);
            }
            other => panic!("unexpected departure: {:?}", other),
        }
        let snapshot = repository.snapshot().await;
        assert!(snapshot.robots.is_empty());
        assert_eq!(snapshot.access_token_count, 0);

        // 失効したトークンでは参加できない
        repository
            .add_connection(id("v9"), Timestamp::new(9000))
            .await
            .unwrap();
        assert!(
            repository
                .join_room(&id("v9"), Some("tok".to_string()), Some("V".to_string()))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_noop() {
        // テスト項目: 2 回目の切断は Unknown で、通知先は無い
        // given (前提条件):
        let repository = create_test_repository();
        repository
            .add_connection(id("c"), Timestamp::new(1000))
            .await
            .unwrap();
        let usecase =
            DisconnectPeerUseCase::new(repository.clone(), Arc::new(pusher_expecting_unregister(2)));

        // when (操作):
        let first = usecase.execute(&id("c")).await;
        let second = usecase.execute(&id("c")).await;

        // then (期待する結果):
        assert_eq!(first, Departure::Unbound);
        assert_eq!(second, Departure::Unknown);
        assert!(second.notify_targets().is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_departure_skips_empty_targets() {
        // テスト項目: 通知先が空なら broadcast は呼ばれない
        // given (前提条件):
        let repository = create_test_repository();
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .withf(|targets, _| targets.len() == 2)
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = DisconnectPeerUseCase::new(repository, Arc::new(pusher));

        // when (操作):
        usecase.broadcast_departure(Vec::new(), "viewer_left").await;
        usecase
            .broadcast_departure(vec![id("r"), id("v1")], "viewer_left")
            .await;

        // then (期待する結果):
        // MockMessagePusher の times(1) で検証
    }
}
