//! Repository trait 定義
//!
//! ブローカー状態へのアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 各メソッドは 1 回の呼び出しで完結する原子的な操作です。実装は同じロボットの
//! ビューア一覧に対する 2 つの操作が交互に実行されないことを保証する必要があります。

use async_trait::async_trait;

use super::{
    broker::{BrokerSnapshot, Departure, JoinedRoom, RelayRoute},
    entity::{RobotSession, SignalingMessage},
    error::BrokerError,
    value_object::{AccessToken, ConnectionId, Timestamp},
};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// 新しい接続を Unbound として登録
    async fn add_connection(
        &self,
        id: ConnectionId,
        connected_at: Timestamp,
    ) -> Result<(), BrokerError>;

    /// ロボットとして登録
    async fn register_robot(
        &self,
        caller: &ConnectionId,
        nickname: Option<String>,
    ) -> Result<RobotSession, BrokerError>;

    /// ロボットが発行したアクセストークンを保存
    async fn store_access_token(
        &self,
        caller: &ConnectionId,
        token: AccessToken,
    ) -> Result<(), BrokerError>;

    /// アクセストークンでルームに参加
    async fn join_room(
        &self,
        caller: &ConnectionId,
        access_token: Option<String>,
        name: Option<String>,
    ) -> Result<JoinedRoom, BrokerError>;

    /// 移動・停止コマンドの宛先ロボット
    async fn command_target(&self, caller: &ConnectionId) -> Result<ConnectionId, BrokerError>;

    /// シグナリングメッセージの中継を認可
    async fn route_signaling(
        &self,
        caller: &ConnectionId,
        message: SignalingMessage,
    ) -> Result<RelayRoute, BrokerError>;

    /// 切断した接続を取り除く
    async fn remove_connection(&self, id: &ConnectionId) -> Departure;

    /// 現在の状態のスナップショット
    async fn snapshot(&self) -> BrokerSnapshot;
}
