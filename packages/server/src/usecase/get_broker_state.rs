//! UseCase: ブローカー状態の取得（HTTP API・デバッグ用）

use std::sync::Arc;

use crate::domain::{BrokerSnapshot, SessionRepository};

pub struct GetBrokerStateUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl GetBrokerStateUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> BrokerSnapshot {
        self.repository.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::Timestamp,
        usecase::test_support::{create_test_repository, id, setup_room},
    };

    #[tokio::test]
    async fn test_get_broker_state_counts() {
        // テスト項目: ロール別の接続数とロボット一覧が返される
        // given (前提条件):
        let repository = create_test_repository();
        setup_room(&repository, &["v1", "v2"]).await;
        repository
            .add_connection(id("c"), Timestamp::new(3000))
            .await
            .unwrap();
        let usecase = GetBrokerStateUseCase::new(repository);

        // when (操作):
        let snapshot = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(snapshot.connection_count, 4);
        assert_eq!(snapshot.unbound_count, 1);
        assert_eq!(snapshot.viewer_count, 2);
        assert_eq!(snapshot.access_token_count, 1);
        assert_eq!(snapshot.robots.len(), 1);
        assert_eq!(snapshot.robots[0].nickname, "R");
    }
}
