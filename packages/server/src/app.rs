//! Dependency wiring.
//!
//! Repository → MessagePusher → UseCases → AppState の順に組み立てます。

use std::{collections::HashMap, sync::Arc};

use kakehashi_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::{
    domain::{Broker, SessionPolicy, TokenGenerator},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemorySessionRepository,
        token::RandomTokenGenerator,
    },
    ui::state::AppState,
    usecase::{
        ConnectPeerUseCase, DisconnectPeerUseCase, GetBrokerStateUseCase,
        IssueAccessTokenUseCase, JoinRoomUseCase, RegisterRobotUseCase, RelaySignalingUseCase,
        RobotCommandUseCase,
    },
};

/// Default access token length
pub const DEFAULT_TOKEN_LENGTH: usize = 16;

/// Broker settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerConfig {
    pub policy: SessionPolicy,
    pub token_length: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            policy: SessionPolicy::default(),
            token_length: DEFAULT_TOKEN_LENGTH,
        }
    }
}

/// 本番用の依存（乱数トークン・システム時計）で AppState を組み立てる
pub fn build_app_state(config: BrokerConfig) -> AppState {
    build_app_state_with(
        config,
        Arc::new(RandomTokenGenerator),
        Arc::new(SystemClock),
    )
}

pub fn build_app_state_with(
    config: BrokerConfig,
    token_generator: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
) -> AppState {
    // 1. Repository (in-memory)
    let broker = Arc::new(Mutex::new(Broker::new(config.policy)));
    let repository = Arc::new(InMemorySessionRepository::new(broker));

    // 2. MessagePusher (WebSocket)
    let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
        HashMap::new(),
    ))));

    // 3. UseCases
    AppState {
        connect_peer_usecase: Arc::new(ConnectPeerUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            clock,
        )),
        disconnect_peer_usecase: Arc::new(DisconnectPeerUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        )),
        register_robot_usecase: Arc::new(RegisterRobotUseCase::new(repository.clone())),
        issue_access_token_usecase: Arc::new(IssueAccessTokenUseCase::new(
            repository.clone(),
            token_generator,
            config.token_length,
        )),
        join_room_usecase: Arc::new(JoinRoomUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        )),
        robot_command_usecase: Arc::new(RobotCommandUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        )),
        relay_signaling_usecase: Arc::new(RelaySignalingUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        )),
        get_broker_state_usecase: Arc::new(GetBrokerStateUseCase::new(repository)),
        message_pusher,
    }
}
