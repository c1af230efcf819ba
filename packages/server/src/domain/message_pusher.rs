//! MessagePusher trait 定義
//!
//! 接続へメッセージを届けるトランスポートの抽象化です。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// 接続ごとの送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// メッセージ送信の trait
///
/// 送信は fire-and-forget です。相手の受信確認は待ちません。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, client_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_client(&self, client_id: &ConnectionId);

    /// 特定の接続に送信
    async fn push_to(&self, client_id: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// 複数の接続に順番に送信
    ///
    /// 一部の接続への送信失敗は許容されます。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
