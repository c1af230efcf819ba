//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! Broker 集約を 1 つの Mutex で保持し、各操作はロックを 1 回だけ取得して完結します。
//! これにより登録・参加・中継・切断の状態変更は全て直列化されます。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    AccessToken, Broker, BrokerError, BrokerSnapshot, ConnectionId, Departure, JoinedRoom,
    RelayRoute, RobotSession, SessionRepository, SignalingMessage, Timestamp,
};

/// インメモリ Session Repository 実装
pub struct InMemorySessionRepository {
    broker: Arc<Mutex<Broker>>,
}

impl InMemorySessionRepository {
    pub fn new(broker: Arc<Mutex<Broker>>) -> Self {
        Self { broker }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn add_connection(
        &self,
        id: ConnectionId,
        connected_at: Timestamp,
    ) -> Result<(), BrokerError> {
        let mut broker = self.broker.lock().await;
        broker.connect(id, connected_at)
    }

    async fn register_robot(
        &self,
        caller: &ConnectionId,
        nickname: Option<String>,
    ) -> Result<RobotSession, BrokerError> {
        let mut broker = self.broker.lock().await;
        broker.register_robot(caller, nickname.as_deref())
    }

    async fn store_access_token(
        &self,
        caller: &ConnectionId,
        token: AccessToken,
    ) -> Result<(), BrokerError> {
        let mut broker = self.broker.lock().await;
        broker.issue_access_token(caller, token)
    }

    async fn join_room(
        &self,
        caller: &ConnectionId,
        access_token: Option<String>,
        name: Option<String>,
    ) -> Result<JoinedRoom, BrokerError> {
        let mut broker = self.broker.lock().await;
        broker.join_room(caller, access_token.as_deref(), name.as_deref())
    }

    async fn command_target(&self, caller: &ConnectionId) -> Result<ConnectionId, BrokerError> {
        let broker = self.broker.lock().await;
        broker.command_target(caller)
    }

    async fn route_signaling(
        &self,
        caller: &ConnectionId,
        message: SignalingMessage,
    ) -> Result<RelayRoute, BrokerError> {
        let broker = self.broker.lock().await;
        broker.route_signaling(caller, message)
    }

    async fn remove_connection(&self, id: &ConnectionId) -> Departure {
        let mut broker = self.broker.lock().await;
        broker.disconnect(id)
    }

    async fn snapshot(&self) -> BrokerSnapshot {
        let broker = self.broker.lock().await;
        broker.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, SessionPolicy};
    use serde_json::json;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemorySessionRepository が Broker 集約へ正しく委譲すること
    // - 共有している Broker に変更が反映されること
    //
    // 【なぜこのテストが必要か】
    // - UseCase はこの Repository 経由でしか状態を変更しない
    // - Option<String> → Option<&str> の変換など委譲部分の取りこぼしを防ぐ
    // ========================================

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn create_test_repository() -> (InMemorySessionRepository, Arc<Mutex<Broker>>) {
        let broker = Arc::new(Mutex::new(Broker::new(SessionPolicy::default())));
        (InMemorySessionRepository::new(broker.clone()), broker)
    }

    #[tokio::test]
    async fn test_add_connection_and_register_robot() {
        // テスト項目: 接続の登録とロボット登録が Broker に反映される
        // given (前提条件):
        let (repo, broker) = create_test_repository();
        repo.add_connection(id("r"), Timestamp::new(1000)).await.unwrap();

        // when (操作):
        let session = repo
            .register_robot(&id("r"), Some("R".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(session.nickname, "R");
        let broker = broker.lock().await;
        assert!(matches!(
            broker.connections().role(&id("r")),
            Ok(Role::Robot(_))
        ));
    }

    #[tokio::test]
    async fn test_full_room_lifecycle() {
        // テスト項目: トークン発行 → 参加 → 中継認可 → 切断 が一連で動作する
        // given (前提条件):
        let (repo, _broker) = create_test_repository();
        repo.add_connection(id("r"), Timestamp::new(1000)).await.unwrap();
        repo.add_connection(id("v"), Timestamp::new(2000)).await.unwrap();
        repo.register_robot(&id("r"), Some("R".to_string()))
            .await
            .unwrap();
        let token = AccessToken::new("token-1".to_string()).unwrap();
        repo.store_access_token(&id("r"), token).await.unwrap();

        // when (操作):
        let joined = repo
            .join_room(&id("v"), Some("token-1".to_string()), Some("V".to_string()))
            .await
            .unwrap();
        let route = repo
            .route_signaling(
                &id("v"),
                SignalingMessage::from_value(json!({"to": "r"})).unwrap(),
            )
            .await
            .unwrap();
        let target = repo.command_target(&id("v")).await.unwrap();
        let departure = repo.remove_connection(&id("v")).await;

        // then (期待する結果):
        assert_eq!(joined.viewer.robot_id, id("r"));
        assert_eq!(route.receiver, id("r"));
        assert_eq!(target, id("r"));
        assert_eq!(departure.notify_targets(), vec![id("r")]);
        let snapshot = repo.snapshot().await;
        assert_eq!(snapshot.connection_count, 1);
        assert!(snapshot.robots[0].viewers.is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_connection_is_idempotent() {
        // テスト項目: 存在しない接続の削除はエラーにならない（冪等性）
        // given (前提条件):
        let (repo, _broker) = create_test_repository();

        // when (操作):
        let departure = repo.remove_connection(&id("ghost")).await;

        // then (期待する結果):
        assert_eq!(departure, Departure::Unknown);
    }
}
