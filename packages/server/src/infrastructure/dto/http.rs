//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Viewer entry inside a robot summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerSummaryDto {
    pub id: String,
    pub name: String,
}

/// `GET /api/robots` item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotSummaryDto {
    pub id: String,
    pub nickname: String,
    pub viewers: Vec<ViewerSummaryDto>,
    /// RFC 3339 (JST)
    pub connected_at: Option<String>,
}

/// `GET /debug/state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerStateDto {
    pub robots: Vec<RobotSummaryDto>,
    pub connection_count: usize,
    pub unbound_count: usize,
    pub viewer_count: usize,
    pub access_token_count: usize,
}
