//! UseCase: ロボット登録処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RegisterRobotUseCase::execute() メソッド
//!
//! ### どのような状況を想定しているか
//! - 正常系：Unbound の接続がロボットになる
//! - 異常系：nickname 欠落、既にロールを持つ接続の再登録

use std::sync::Arc;

use crate::domain::{BrokerError, ConnectionId, RobotSession, SessionRepository};

/// ロボット登録のユースケース
pub struct RegisterRobotUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl RegisterRobotUseCase {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// ロボット登録を実行
    ///
    /// 成功時のセッションは呼び出し元にのみ返します（他の接続への通知はありません）。
    pub async fn execute(
        &self,
        caller: &ConnectionId,
        nickname: Option<String>,
    ) -> Result<RobotSession, BrokerError> {
        let session = self.repository.register_robot(caller, nickname).await?;
        tracing::info!("Robot '{}' registered as \"{}\"", caller, session.nickname);
        Ok(session)
    }
}
