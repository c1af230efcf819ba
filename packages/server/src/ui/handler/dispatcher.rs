//! Inbound event dispatcher.
//!
//! 受信フレームを解析し、イベント名ごとの関数に振り分けます。各関数は
//! `(caller, state, payload) -> Result<T, BrokerError>` の形で、結果は `respond` が
//! `<event>:success` / `<event>:error` としてリクエスト元にのみ返します。

use serde::Serialize;
use serde_json::Value;

use crate::{
    domain::{BrokerError, ConnectionId},
    infrastructure::dto::websocket::{
        AccessTokenDto, InboundEvent, InboundFrame, JoinRoomRequest, RegisterRobotRequest,
        RobotDto, STOP_COMMAND, ViewerDto, decode_payload, encode, outbound,
    },
    ui::state::AppState,
};

/// 1 フレームを処理する
///
/// 応答とピアへの通知は、この関数が戻る前に全て送信キューに積まれます。
pub async fn dispatch(state: &AppState, caller: &ConnectionId, text: &str) {
    let frame = match serde_json::from_str::<InboundFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Failed to parse frame from '{}': {}", caller, e);
            send_frame(state, caller, outbound::ERROR, &format!("Invalid frame: {}", e)).await;
            return;
        }
    };

    let Some(event) = InboundEvent::parse(&frame.event) else {
        tracing::warn!("Unknown event '{}' from '{}'", frame.event, caller);
        send_frame(
            state,
            caller,
            outbound::ERROR,
            &format!("Unknown event: {}", frame.event),
        )
        .await;
        return;
    };

    match event {
        InboundEvent::RegisterRobot => {
            let result = register_robot(caller, state, frame.data).await;
            respond(state, caller, event, result).await;
        }
        InboundEvent::GetRoomAccess => {
            let result = get_room_access(caller, state).await;
            respond(state, caller, event, result).await;
        }
        InboundEvent::MoveRequest => {
            let result = move_request(caller, state, frame.data).await;
            respond(state, caller, event, result).await;
        }
        InboundEvent::StopRequest => {
            let result = stop_request(caller, state).await;
            respond(state, caller, event, result).await;
        }
        InboundEvent::JoinRoom => {
            let result = join_room(caller, state, frame.data).await;
            respond(state, caller, event, result).await;
        }
        InboundEvent::SignalingMessage => {
            let result = signaling_message(caller, state, frame.data).await;
            respond(state, caller, event, result).await;
        }
    }
}

async fn register_robot(
    caller: &ConnectionId,
    state: &AppState,
    payload: Value,
) -> Result<RobotDto, BrokerError> {
    let request: RegisterRobotRequest = decode_payload(payload).map_err(invalid_payload)?;
    let session = state
        .register_robot_usecase
        .execute(caller, request.nickname)
        .await?;
    Ok(RobotDto::from(&session))
}

async fn get_room_access(
    caller: &ConnectionId,
    state: &AppState,
) -> Result<AccessTokenDto, BrokerError> {
    let token = state.issue_access_token_usecase.execute(caller).await?;
    Ok(AccessTokenDto {
        access_token: token.into_string(),
    })
}

async fn move_request(
    caller: &ConnectionId,
    state: &AppState,
    payload: Value,
) -> Result<(), BrokerError> {
    let command = encode(outbound::DO_ROBOT_MOVEMENT, &payload).map_err(invalid_payload)?;
    state
        .robot_command_usecase
        .execute(caller, &command)
        .await?;
    Ok(())
}

async fn stop_request(caller: &ConnectionId, state: &AppState) -> Result<(), BrokerError> {
    let command = encode(outbound::DO_ROBOT_STOP, &STOP_COMMAND).map_err(invalid_payload)?;
    state
        .robot_command_usecase
        .execute(caller, &command)
        .await?;
    Ok(())
}

async fn join_room(
    caller: &ConnectionId,
    state: &AppState,
    payload: Value,
) -> Result<ViewerDto, BrokerError> {
    let request: JoinRoomRequest = decode_payload(payload).map_err(invalid_payload)?;
    let name = request.viewer_info.and_then(|info| info.name);

    let joined = state
        .join_room_usecase
        .execute(caller, request.access_token, name)
        .await?;

    let viewer = ViewerDto::from(&joined.viewer);
    match encode(outbound::VIEWER_ADD, &viewer) {
        Ok(json) => {
            state
                .join_room_usecase
                .notify_viewer_added(&joined, &json)
                .await
        }
        Err(e) => tracing::error!("Failed to encode viewer_add: {}", e),
    }
    Ok(viewer)
}

async fn signaling_message(
    caller: &ConnectionId,
    state: &AppState,
    payload: Value,
) -> Result<Value, BrokerError> {
    let route = state
        .relay_signaling_usecase
        .execute(caller, payload)
        .await?;

    let message = route.message.to_value();
    let forwarded = encode(outbound::SIGNALING_MESSAGE, &message).map_err(invalid_payload)?;
    state
        .relay_signaling_usecase
        .deliver(&route.receiver, &forwarded)
        .await;

    tracing::debug!("Relayed signaling message from '{}' to '{}'", caller, route.receiver);
    Ok(message)
}

/// 処理結果をリクエスト元に返す
async fn respond<T: Serialize>(
    state: &AppState,
    caller: &ConnectionId,
    event: InboundEvent,
    result: Result<T, BrokerError>,
) {
    match result {
        Ok(payload) => send_frame(state, caller, &event.success_event(), &payload).await,
        Err(e) => {
            tracing::warn!("{} from '{}' rejected: {}", event.as_str(), caller, e);
            send_frame(state, caller, &event.error_event(), &e.to_string()).await;
        }
    }
}

async fn send_frame<T: Serialize>(state: &AppState, caller: &ConnectionId, event: &str, data: &T) {
    let json = match encode(event, data) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to encode '{}' frame: {}", event, e);
            return;
        }
    };
    if let Err(e) = state.message_pusher.push_to(caller, &json).await {
        tracing::warn!("Failed to respond to '{}': {}", caller, e);
    }
}

fn invalid_payload(e: serde_json::Error) -> BrokerError {
    BrokerError::Validation(format!("Invalid payload: {}", e))
}
