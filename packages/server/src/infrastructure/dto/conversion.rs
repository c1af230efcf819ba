//! ドメインモデル → DTO の変換

use kakehashi_shared::time::millis_to_jst_rfc3339;

use crate::domain::{BrokerSnapshot, ConnectionId, RobotSession, RobotSummary, ViewerRef};
use crate::infrastructure::dto::{http, websocket as ws};

impl From<&ViewerRef> for ws::ViewerDto {
    fn from(viewer: &ViewerRef) -> Self {
        Self {
            id: viewer.id.as_str().to_string(),
            name: viewer.name.clone(),
            robot: ws::RobotRefDto {
                id: viewer.robot_id.as_str().to_string(),
            },
        }
    }
}

impl From<&RobotSession> for ws::RobotDto {
    fn from(session: &RobotSession) -> Self {
        Self {
            nickname: session.nickname.clone(),
            viewers: session.viewers.iter().map(ws::ViewerDto::from).collect(),
        }
    }
}

impl From<&ConnectionId> for ws::ConnectedDto {
    fn from(id: &ConnectionId) -> Self {
        Self {
            id: id.as_str().to_string(),
        }
    }
}

impl From<&RobotSummary> for http::RobotSummaryDto {
    fn from(robot: &RobotSummary) -> Self {
        Self {
            id: robot.id.as_str().to_string(),
            nickname: robot.nickname.clone(),
            viewers: robot
                .viewers
                .iter()
                .map(|viewer| http::ViewerSummaryDto {
                    id: viewer.id.as_str().to_string(),
                    name: viewer.name.clone(),
                })
                .collect(),
            connected_at: millis_to_jst_rfc3339(robot.connected_at.value()),
        }
    }
}

impl From<&BrokerSnapshot> for http::BrokerStateDto {
    fn from(snapshot: &BrokerSnapshot) -> Self {
        Self {
            robots: snapshot
                .robots
                .iter()
                .map(http::RobotSummaryDto::from)
                .collect(),
            connection_count: snapshot.connection_count,
            unbound_count: snapshot.unbound_count,
            viewer_count: snapshot.viewer_count,
            access_token_count: snapshot.access_token_count,
        }
    }
}
