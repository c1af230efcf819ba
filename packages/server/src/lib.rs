//! Signaling broker library.
//!
//! Pairs robot endpoints with viewer endpoints over WebSocket, hands out access
//! tokens for joining a robot's room, and relays movement commands and
//! WebRTC signaling messages between paired endpoints.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod app;
