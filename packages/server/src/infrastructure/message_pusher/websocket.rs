//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - 接続へのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の受け付けと書き込みタスクの起動は UI 層（`ui/handler/websocket.rs`）で行います。
//! この実装は UI 層が生成した sender を受け取り、キューに積むだけです。送信はブロックしません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// WebSocket を使った MessagePusher 実装
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new(Arc::new(Mutex::new(HashMap::new())));
/// pusher.register_client(connection_id.clone(), tx).await;
/// pusher.push_to(&connection_id, r#"{"event":"connected","data":{"id":"..."}}"#).await?;
/// ```
pub struct WebSocketMessagePusher {
    /// Key: 接続 ID, Value: 書き込みタスクへのチャンネル
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, client_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", client_id);
        clients.insert(client_id, sender);
    }

    async fn unregister_client(&self, client_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(client_id);
        tracing::debug!("Connection '{}' unregistered from MessagePusher", client_id);
    }

    async fn push_to(
        &self,
        client_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(client_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(client_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", client_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                Some(sender) => {
                    // 一部の送信失敗は許容
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!("Failed to push message to connection '{}': {}", target, e);
                    } else {
                        tracing::debug!("Broadcasted message to connection '{}'", target);
                    }
                }
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定の接続への送信とエラー
    // - broadcast: 指定した順序での送信、存在しない接続のスキップ
    //
    // 【なぜこのテストが必要か】
    // - 通知の順序（ロボット → ビューア参加順）はこの実装の送信順に依存する
    // ========================================

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn create_test_pusher() -> (
        WebSocketMessagePusher,
        Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
    ) {
        let clients = Arc::new(Mutex::new(HashMap::new()));
        (WebSocketMessagePusher::new(clients.clone()), clients)
    }

    #[tokio::test]
    async fn test_register_and_push_to() {
        // テスト項目: 登録した接続にメッセージを送信できる
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(id("robot"), tx).await;

        // when (操作):
        let result = pusher.push_to(&id("robot"), "hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection() {
        // テスト項目: 未登録の接続への送信は ClientNotFound
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();

        // when (操作):
        let result = pusher.push_to(&id("ghost"), "hello").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ClientNotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_push_to_closed_channel() {
        // テスト項目: 受信側が閉じたチャンネルへの送信は PushFailed
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_client(id("robot"), tx).await;
        drop(rx);

        // when (操作):
        let result = pusher.push_to(&id("robot"), "hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::PushFailed(_))));
    }

    #[tokio::test]
    async fn test_unregister_client() {
        // テスト項目: 登録解除した接続には送信できない
        // given (前提条件):
        let (pusher, clients) = create_test_pusher();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_client(id("viewer"), tx).await;

        // when (操作):
        pusher.unregister_client(&id("viewer")).await;

        // then (期待する結果):
        assert!(clients.lock().await.is_empty());
        assert!(pusher.push_to(&id("viewer"), "hello").await.is_err());
    }

    #[tokio::test]
    async fn test_broadcast_skips_missing_targets() {
        // テスト項目: 存在しない接続はスキップし、残りには送信される
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        pusher.register_client(id("a"), tx1).await;
        pusher.register_client(id("b"), tx2).await;

        // when (操作):
        let result = pusher
            .broadcast(vec![id("a"), id("ghost"), id("b")], "left")
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some("left".to_string()));
        assert_eq!(rx2.recv().await, Some("left".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_empty_targets() {
        // テスト項目: 空のターゲットリストでもエラーにならない
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();

        // when (操作):
        let result = pusher.broadcast(vec![], "Message").await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
