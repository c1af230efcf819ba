//! WebSocket and HTTP handlers.

mod dispatcher;
mod http;
mod websocket;

pub use http::{debug_broker_state, get_robots, health_check};
pub use websocket::websocket_handler;
