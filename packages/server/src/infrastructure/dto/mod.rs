//! Data Transfer Objects (DTOs)
//!
//! - `websocket`: WebSocket フレーム（イベント名 + ペイロード）
//! - `http`: HTTP API レスポンス
//! - `conversion`: ドメインモデル → DTO の変換

pub mod conversion;
pub mod http;
pub mod websocket;
