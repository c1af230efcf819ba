//! UseCase: アクセストークン発行処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - IssueAccessTokenUseCase::execute() メソッド
//! - 注入した TokenGenerator の値がそのまま保存・返却されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：ロボットからの発行要求
//! - 異常系：ロボット以外からの発行要求
//! - 生成値が別ロボットのトークンと衝突した場合の再生成

use std::sync::Arc;

use crate::domain::{AccessToken, BrokerError, ConnectionId, SessionRepository, TokenGenerator};

/// 衝突時にトークンを生成し直す最大回数（初回を含む）
const MAX_GENERATE_ATTEMPTS: usize = 5;

/// アクセストークン発行のユースケース
pub struct IssueAccessTokenUseCase {
    repository: Arc<dyn SessionRepository>,
    token_generator: Arc<dyn TokenGenerator>,
    token_length: usize,
}

impl IssueAccessTokenUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        token_generator: Arc<dyn TokenGenerator>,
        token_length: usize,
    ) -> Self {
        Self {
            repository,
            token_generator,
            token_length,
        }
    }

    /// トークンを生成し、呼び出し元ロボットに紐づけて保存
    ///
    /// 別ロボットのトークンと衝突した場合は `MAX_GENERATE_ATTEMPTS` 回まで生成し直します。
    pub async fn execute(&self, caller: &ConnectionId) -> Result<AccessToken, BrokerError> {
        let mut attempt = 1;
        loop {
            let token = AccessToken::new(self.token_generator.generate(self.token_length))
                .map_err(|_| {
                    BrokerError::Validation("Generated access token is empty".to_string())
                })?;

            match self
                .repository
                .store_access_token(caller, token.clone())
                .await
            {
                Ok(()) => {
                    tracing::trace!(
                        "Access token granted for robot '{}'. Access Token: \"{}\"",
                        caller,
                        token.as_str()
                    );
                    return Ok(token);
                }
                Err(BrokerError::TokenCollision) if attempt < MAX_GENERATE_ATTEMPTS => {
                    tracing::warn!(
                        "Access token for robot '{}' collided (attempt {}), regenerating",
                        caller,
                        attempt
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Timestamp, token::MockTokenGenerator},
        usecase::test_support::{create_test_repository, id, setup_room},
    };

    fn fixed_generator(value: &'static str) -> MockTokenGenerator {
        let mut generator = MockTokenGenerator::new();
        generator
            .expect_generate()
            .returning(move |_| value.to_string());
        generator
    }

    #[tokio::test]
    async fn test_issue_access_token_success() {
        // テスト項目: ロボットがトークンを取得でき、そのトークンで参加できる
        // given (前提条件):
        let repository = create_test_repository();
        setup_room(&repository, &[]).await;
        let mut generator = MockTokenGenerator::new();
        generator
            .expect_generate()
            .withf(|length| *length == 16)
            .times(1)
            .returning(|_| "AbCd1234EfGh5678".to_string());
        let usecase = IssueAccessTokenUseCase::new(repository.clone(), Arc::new(generator), 16);
        repository
            .add_connection(id("v1"), Timestamp::new(3000))
            .await
            .unwrap();

        // when (操作):
        let token = usecase.execute(&id("r")).await.unwrap();

        // then (期待する結果):
        assert_eq!(token.as_str(), "AbCd1234EfGh5678");
        let joined = repository
            .join_room(
                &id("v1"),
                Some("AbCd1234EfGh5678".to_string()),
                Some("V".to_string()),
            )
            .await;
        assert!(joined.is_ok());
    }

    #[tokio::test]
    async fn test_issue_access_token_not_a_robot() {
        // テスト項目: ロボット以外からの要求は NotARobot でトークンは保存されない
        // given (前提条件):
        let repository = create_test_repository();
        repository
            .add_connection(id("c"), Timestamp::new(1000))
            .await
            .unwrap();
        let usecase =
            IssueAccessTokenUseCase::new(repository.clone(), Arc::new(fixed_generator("x")), 1);

        // when (操作):
        let result = usecase.execute(&id("c")).await;

        // then (期待する結果):
        assert_eq!(result, Err(BrokerError::NotARobot));
        assert_eq!(repository.snapshot().await.access_token_count, 0);
    }

    #[tokio::test]
    async fn test_issue_access_token_multiple_times() {
        // テスト項目: 同じロボットが複数のトークンを発行できる
        // given (前提条件):
        let repository = create_test_repository();
        setup_room(&repository, &[]).await;
        let mut generator = MockTokenGenerator::new();
        let mut counter = 0;
        generator.expect_generate().times(2).returning(move |_| {
            counter += 1;
            format!("token-{}", counter)
        });
        let usecase = IssueAccessTokenUseCase::new(repository.clone(), Arc::new(generator), 8);

        // when (操作):
        let first = usecase.execute(&id("r")).await.unwrap();
        let second = usecase.execute(&id("r")).await.unwrap();

        // then (期待する結果):
        assert_ne!(first, second);
        // setup_room の "tok" を含めて 3 件
        assert_eq!(repository.snapshot().await.access_token_count, 3);
    }

    #[tokio::test]
    async fn test_issue_access_token_regenerates_on_collision() {
        // テスト項目: 別ロボットのトークンと同じ値が生成されたら生成し直し、元のトークンは元のロボットのまま
        // given (前提条件):
        let repository = create_test_repository();
        setup_room(&repository, &[]).await;
        repository
            .add_connection(id("rb"), Timestamp::new(1500))
            .await
            .unwrap();
        repository
            .register_robot(&id("rb"), Some("RB".to_string()))
            .await
            .unwrap();
        let mut generator = MockTokenGenerator::new();
        let mut values = vec!["fresh", "tok", "tok"];
        generator
            .expect_generate()
            .times(3)
            .returning(move |_| values.pop().unwrap().to_string());
        let usecase = IssueAccessTokenUseCase::new(repository.clone(), Arc::new(generator), 3);
        repository
            .add_connection(id("v"), Timestamp::new(3000))
            .await
            .unwrap();

        // when (操作):
        let token = usecase.execute(&id("rb")).await.unwrap();

        // then (期待する結果):
        assert_eq!(token.as_str(), "fresh");
        let joined = repository
            .join_room(&id("v"), Some("tok".to_string()), Some("V".to_string()))
            .await
            .unwrap();
        assert_eq!(joined.viewer.robot_id, id("r"));
    }

    #[tokio::test]
    async fn test_issue_access_token_gives_up_after_repeated_collisions() {
        // テスト項目: 衝突が続く場合は上限回数で諦めて TokenCollision を返す
        // given (前提条件):
        let repository = create_test_repository();
        setup_room(&repository, &[]).await;
        repository
            .add_connection(id("rb"), Timestamp::new(1500))
            .await
            .unwrap();
        repository
            .register_robot(&id("rb"), Some("RB".to_string()))
            .await
            .unwrap();
        let mut generator = MockTokenGenerator::new();
        generator
            .expect_generate()
            .times(MAX_GENERATE_ATTEMPTS)
            .returning(|_| "tok".to_string());
        let usecase = IssueAccessTokenUseCase::new(repository.clone(), Arc::new(generator), 3);

        // when (操作):
        let result = usecase.execute(&id("rb")).await;

        // then (期待する結果):
        assert_eq!(result, Err(BrokerError::TokenCollision));
        assert_eq!(repository.snapshot().await.access_token_count, 1);
    }
}
