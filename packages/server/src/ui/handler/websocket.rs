//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{Stream, sink::SinkExt, stream::StreamExt};
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, Departure},
    infrastructure::dto::websocket::{
        ConnectedDto, RobotDisconnectedDto, ViewerDto, encode, outbound,
    },
    ui::state::AppState,
    usecase::ConnectError,
};

use super::dispatcher::dispatch;

/// 接続の登録はアップグレード完了後に行う（失敗したハンドシェイクは何も残さない）
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that forwards queued frames from the rx channel to the WebSocket sender.
///
/// Every frame addressed to this connection (responses and peer notifications)
/// goes through this channel, so they reach the socket in the order they were enqueued.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// 受信したフレームを 1 つずつ順番に処理する
///
/// `stop` はフレームの合間にだけ確認するため、処理中のフレームの応答と通知は
/// 途中で打ち切られません。
async fn read_frames<S>(
    mut receiver: S,
    mut stop: oneshot::Receiver<()>,
    state: Arc<AppState>,
    caller: ConnectionId,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let next = tokio::select! {
            _ = &mut stop => {
                tracing::debug!("Reader for '{}' stopped", caller);
                break;
            }
            next = receiver.next() => next,
        };
        let Some(msg) = next else {
            break;
        };

        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("WebSocket error on '{}': {}", caller, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received frame from '{}': {}", caller, text.as_str());
                dispatch(&state, &caller, text.as_str()).await;
            }
            Message::Ping(_) => {
                tracing::debug!("Received ping");
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", caller);
                break;
            }
            _ => {}
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionIdFactory::generate();

    // Create a channel for this connection to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // register_client is called inside the UseCase
    match state
        .connect_peer_usecase
        .execute(connection_id.clone(), tx)
        .await
    {
        Ok(connected_at) => {
            tracing::info!(
                "Connection '{}' accepted at {}",
                connection_id,
                connected_at.value()
            );
        }
        Err(ConnectError::DuplicateConnectionId(id)) => {
            tracing::warn!("Connection ID '{}' is already registered. Closing.", id);
            return;
        }
    }

    let (sender, receiver) = socket.split();

    // Tell the endpoint its own connection id
    match encode(outbound::CONNECTED, &ConnectedDto::from(&connection_id)) {
        Ok(json) => {
            if let Err(e) = state.connect_peer_usecase.greet(&connection_id, &json).await {
                tracing::warn!("Failed to greet '{}': {}", connection_id, e);
            }
        }
        Err(e) => tracing::error!("Failed to encode connected frame: {}", e),
    }

    let mut send_task = pusher_loop(rx, sender);

    let (stop_tx, stop_rx) = oneshot::channel();
    let mut recv_task = tokio::spawn(read_frames(
        receiver,
        stop_rx,
        state.clone(),
        connection_id.clone(),
    ));

    let writer_finished = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => true,
    };
    if writer_finished {
        // 書き込み側が先に終わった場合も、処理中のフレームは最後まで実行させる
        let _ = stop_tx.send(());
        if let Err(e) = recv_task.await {
            tracing::error!("Reader task for '{}' failed: {}", connection_id, e);
        }
    } else {
        send_task.abort();
    }

    let departure = state
        .disconnect_peer_usecase
        .execute(&connection_id)
        .await;
    notify_departure(&state, &departure).await;
}

async fn notify_departure(state: &AppState, departure: &Departure) {
    let encoded = match departure {
        Departure::Unknown | Departure::Unbound => return,
        Departure::Viewer { viewer, .. } => encode(outbound::VIEWER_LEFT, &ViewerDto::from(viewer)),
        Departure::Robot {
            robot_id, nickname, ..
        } => encode(
            outbound::ROBOT_DISCONNECTED,
            &RobotDisconnectedDto {
                id: robot_id.as_str().to_string(),
                nickname: nickname.clone(),
            },
        ),
    };

    match encoded {
        Ok(json) => {
            state
                .disconnect_peer_usecase
                .broadcast_departure(departure.notify_targets(), &json)
                .await;
        }
        Err(e) => tracing::error!("Failed to encode departure notification: {}", e),
    }
}
