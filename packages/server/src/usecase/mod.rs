//! UseCase 層
//!
//! 1 つの操作につき 1 つの UseCase。状態の変更は SessionRepository、通知は MessagePusher
//! 経由で行います。通知内容（JSON）の組み立ては UI 層の責務です。

mod connect_peer;
mod disconnect_peer;
mod error;
mod get_broker_state;
mod issue_access_token;
mod join_room;
mod register_robot;
mod relay_signaling;
mod robot_command;

pub use connect_peer::ConnectPeerUseCase;
pub use disconnect_peer::DisconnectPeerUseCase;
pub use error::ConnectError;
pub use get_broker_state::GetBrokerStateUseCase;
pub use issue_access_token::IssueAccessTokenUseCase;
pub use join_room::JoinRoomUseCase;
pub use register_robot::RegisterRobotUseCase;
pub use relay_signaling::RelaySignalingUseCase;
pub use robot_command::RobotCommandUseCase;
