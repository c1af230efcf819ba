//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{BrokerStateDto, RobotSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of registered robots with their viewers
pub async fn get_robots(State(state): State<Arc<AppState>>) -> Json<Vec<RobotSummaryDto>> {
    let snapshot = state.get_broker_state_usecase.execute().await;

    // Domain Model から DTO への変換
    let robots = snapshot.robots.iter().map(RobotSummaryDto::from).collect();

    Json(robots)
}

/// Debug endpoint to get current broker state (for testing purposes)
///
/// Access tokens are counted but never listed.
pub async fn debug_broker_state(State(state): State<Arc<AppState>>) -> Json<BrokerStateDto> {
    let snapshot = state.get_broker_state_usecase.execute().await;
    Json(BrokerStateDto::from(&snapshot))
}
