//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    domain::MessagePusher,
    usecase::{
        ConnectPeerUseCase, DisconnectPeerUseCase, GetBrokerStateUseCase,
        IssueAccessTokenUseCase, JoinRoomUseCase, RegisterRobotUseCase, RelaySignalingUseCase,
        RobotCommandUseCase,
    },
};

/// Shared application state
pub struct AppState {
    pub connect_peer_usecase: Arc<ConnectPeerUseCase>,
    pub disconnect_peer_usecase: Arc<DisconnectPeerUseCase>,
    pub register_robot_usecase: Arc<RegisterRobotUseCase>,
    pub issue_access_token_usecase: Arc<IssueAccessTokenUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub robot_command_usecase: Arc<RobotCommandUseCase>,
    pub relay_signaling_usecase: Arc<RelaySignalingUseCase>,
    pub get_broker_state_usecase: Arc<GetBrokerStateUseCase>,
    /// MessagePusher（リクエスト元への応答用）
    pub message_pusher: Arc<dyn MessagePusher>,
}
