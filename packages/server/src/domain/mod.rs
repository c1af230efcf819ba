//! ドメイン層
//!
//! ブローカーの状態（接続ごとのロール、ロボットセッション、アクセストークン）と
//! その状態遷移を表現します。I/O は一切行わず、外部との境界は trait で定義します。

pub mod access_token_store;
pub mod broker;
pub mod connection_registry;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod policy;
pub mod repository;
pub mod token;
pub mod value_object;

pub use access_token_store::AccessTokenStore;
pub use broker::{Broker, BrokerSnapshot, Departure, JoinedRoom, RelayRoute, RobotSummary};
pub use connection_registry::{ConnectionEntry, ConnectionRegistry};
pub use entity::{RobotSession, Role, SignalingMessage, ViewerRef};
pub use error::{BrokerError, MessagePushError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use policy::{SessionPolicy, TokenPolicy};
pub use repository::SessionRepository;
pub use token::TokenGenerator;
pub use value_object::{AccessToken, ConnectionId, ConnectionIdFactory, Timestamp};
