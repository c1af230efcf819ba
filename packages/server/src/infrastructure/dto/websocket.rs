//! WebSocket message DTOs.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`. Responses to a
//! request use `<event>:success` / `<event>:error`.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Stop command sent to the robot on `stop_request`
pub const STOP_COMMAND: &str = "S";

/// Server-initiated event names
pub mod outbound {
    pub const CONNECTED: &str = "connected";
    pub const VIEWER_ADD: &str = "viewer_add";
    pub const VIEWER_LEFT: &str = "viewer_left";
    pub const ROBOT_DISCONNECTED: &str = "robot_disconnected";
    pub const DO_ROBOT_MOVEMENT: &str = "do_robot_movement";
    pub const DO_ROBOT_STOP: &str = "do_robot_stop";
    pub const SIGNALING_MESSAGE: &str = "signaling_message";
    /// Frames that could not be dispatched at all
    pub const ERROR: &str = "error";
}

/// Client-initiated events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEvent {
    RegisterRobot,
    GetRoomAccess,
    MoveRequest,
    StopRequest,
    JoinRoom,
    SignalingMessage,
}

impl InboundEvent {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "register_robot" => Some(Self::RegisterRobot),
            "get_room_access" => Some(Self::GetRoomAccess),
            "move_request" => Some(Self::MoveRequest),
            "stop_request" => Some(Self::StopRequest),
            "join_room" => Some(Self::JoinRoom),
            "signaling_message" => Some(Self::SignalingMessage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisterRobot => "register_robot",
            Self::GetRoomAccess => "get_room_access",
            Self::MoveRequest => "move_request",
            Self::StopRequest => "stop_request",
            Self::JoinRoom => "join_room",
            Self::SignalingMessage => "signaling_message",
        }
    }

    pub fn success_event(&self) -> String {
        format!("{}:success", self.as_str())
    }

    pub fn error_event(&self) -> String {
        format!("{}:error", self.as_str())
    }
}

/// Incoming frame
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Outgoing frame
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame<'a, T: Serialize> {
    pub event: &'a str,
    pub data: &'a T,
}

/// Serialize `data` as an outgoing frame named `event`
pub fn encode<T: Serialize>(event: &str, data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundFrame { event, data })
}

/// Decode a request payload; a missing / `null` payload yields the default request
pub fn decode_payload<T: DeserializeOwned + Default>(data: Value) -> Result<T, serde_json::Error> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRobotRequest {
    #[serde(default, alias = "nickName")]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub viewer_info: Option<ViewerInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewerInfo {
    #[serde(default)]
    pub name: Option<String>,
}

/// `connected` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedDto {
    pub id: String,
}

/// Robot reference inside a viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotRefDto {
    pub id: String,
}

/// `join_room:success` / `viewer_add` / `viewer_left` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerDto {
    pub id: String,
    pub name: String,
    pub robot: RobotRefDto,
}

/// `register_robot:success` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotDto {
    pub nickname: String,
    pub viewers: Vec<ViewerDto>,
}

/// `get_room_access:success` payload
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenDto {
    pub access_token: String,
}

/// `robot_disconnected` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotDisconnectedDto {
    pub id: String,
    pub nickname: String,
}
