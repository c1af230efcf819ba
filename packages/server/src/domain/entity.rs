//! エンティティ
//!
//! 接続に紐づくセッション状態を表現します。

use serde_json::{Map, Value};

use super::{error::BrokerError, value_object::ConnectionId};

/// ルームに参加したビューアへの参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerRef {
    /// ビューア自身の接続 ID
    pub id: ConnectionId,
    /// 表示名
    pub name: String,
    /// ペアリング先ロボットの接続 ID
    pub robot_id: ConnectionId,
}

impl ViewerRef {
    pub fn new(id: ConnectionId, name: String, robot_id: ConnectionId) -> Self {
        Self { id, name, robot_id }
    }
}

/// ロボットとして登録された接続のセッション
///
/// `viewers` は参加順を保持します。通知はこの順序で行われます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotSession {
    pub nickname: String,
    pub viewers: Vec<ViewerRef>,
}

impl RobotSession {
    pub fn new(nickname: String) -> Self {
        Self {
            nickname,
            viewers: Vec::new(),
        }
    }

    pub fn has_viewer(&self, id: &ConnectionId) -> bool {
        self.viewers.iter().any(|viewer| &viewer.id == id)
    }

    /// 参加順のビューア ID 一覧
    pub fn viewer_ids(&self) -> Vec<ConnectionId> {
        self.viewers.iter().map(|viewer| viewer.id.clone()).collect()
    }

    pub fn add_viewer(&mut self, viewer: ViewerRef) {
        self.viewers.push(viewer);
    }

    /// 接続 ID が一致するビューアを取り除く
    pub fn remove_viewer(&mut self, id: &ConnectionId) -> Option<ViewerRef> {
        let position = self.viewers.iter().position(|viewer| &viewer.id == id)?;
        Some(self.viewers.remove(position))
    }
}

/// 接続のロール
///
/// `Unbound` から `Robot` / `Viewer` への遷移は一度だけ。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Unbound,
    Robot(RobotSession),
    Viewer(ViewerRef),
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Unbound => "unbound",
            Role::Robot(_) => "robot",
            Role::Viewer(_) => "viewer",
        }
    }

    pub fn is_unbound(&self) -> bool {
        matches!(self, Role::Unbound)
    }
}

/// シグナリングメッセージ
///
/// `to` 以外の中身は解釈せずにそのまま転送します。
#[derive(Debug, Clone, PartialEq)]
pub struct SignalingMessage {
    to: String,
    fields: Map<String, Value>,
}

impl SignalingMessage {
    pub fn from_value(value: Value) -> Result<Self, BrokerError> {
        let fields = match value {
            Value::Null => {
                return Err(BrokerError::Validation(
                    "You must pass a message parameter".to_string(),
                ));
            }
            Value::Object(fields) => fields,
            _ => {
                return Err(BrokerError::Validation(
                    "The message parameter must be an object".to_string(),
                ));
            }
        };

        let to = match fields.get("to") {
            Some(Value::String(to)) if !to.is_empty() => to.clone(),
            _ => {
                return Err(BrokerError::Validation(
                    "The message.to param is mandatory".to_string(),
                ));
            }
        };

        Ok(Self { to, fields })
    }

    /// 宛先の接続 ID（未検証の生文字列）
    pub fn to(&self) -> &str {
        &self.to
    }

    /// 送信者をスタンプする（クライアントが指定した `from` は上書き）
    pub fn stamp_from(&mut self, from: &ConnectionId) {
        self.fields
            .insert("from".to_string(), Value::String(from.as_str().to_string()));
    }

    pub fn from(&self) -> Option<&str> {
        self.fields.get("from").and_then(Value::as_str)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_robot_session_keeps_join_order() {
        // テスト項目: ビューアは参加順に保持される
        // given (前提条件):
        let mut session = RobotSession::new("R".to_string());

        // when (操作):
        session.add_viewer(ViewerRef::new(id("v2"), "B".to_string(), id("r")));
        session.add_viewer(ViewerRef::new(id("v1"), "A".to_string(), id("r")));

        // then (期待する結果):
        assert_eq!(session.viewer_ids(), vec![id("v2"), id("v1")]);
    }

    #[test]
    fn test_robot_session_remove_viewer_by_id() {
        // テスト項目: 接続 ID でビューアを削除でき、順序が保たれる
        // given (前提条件):
        let mut session = RobotSession::new("R".to_string());
        session.add_viewer(ViewerRef::new(id("v1"), "A".to_string(), id("r")));
        session.add_viewer(ViewerRef::new(id("v2"), "B".to_string(), id("r")));
        session.add_viewer(ViewerRef::new(id("v3"), "C".to_string(), id("r")));

        // when (操作):
        let removed = session.remove_viewer(&id("v2"));

        // then (期待する結果):
        assert_eq!(removed.map(|v| v.name), Some("B".to_string()));
        assert_eq!(session.viewer_ids(), vec![id("v1"), id("v3")]);
    }

    #[test]
    fn test_robot_session_remove_missing_viewer() {
        // テスト項目: 存在しないビューアの削除は None を返す
        // given (前提条件):
        let mut session = RobotSession::new("R".to_string());

        // when (操作):
        let removed = session.remove_viewer(&id("nobody"));

        // then (期待する結果):
        assert!(removed.is_none());
    }

    #[test]
    fn test_signaling_message_requires_payload() {
        // テスト項目: メッセージが無い場合は ValidationError
        // given (前提条件):
        let value = Value::Null;

        // when (操作):
        let result = SignalingMessage::from_value(value);

        // then (期待する結果):
        assert!(matches!(result, Err(BrokerError::Validation(_))));
    }

    #[test]
    fn test_signaling_message_requires_to() {
        // テスト項目: to が無い、または文字列でない場合は ValidationError
        // given (前提条件):
        let missing = json!({"type": "offer"});
        let not_string = json!({"to": 42});

        // when (操作):
        let missing_result = SignalingMessage::from_value(missing);
        let not_string_result = SignalingMessage::from_value(not_string);

        // then (期待する結果):
        assert!(matches!(missing_result, Err(BrokerError::Validation(_))));
        assert!(matches!(not_string_result, Err(BrokerError::Validation(_))));
    }

    #[test]
    fn test_signaling_message_stamp_overwrites_from() {
        // テスト項目: from はクライアント指定値に関わらず送信者で上書きされる
        // given (前提条件):
        let mut message =
            SignalingMessage::from_value(json!({"to": "r", "from": "spoofed", "sdp": "x"}))
                .unwrap();

        // when (操作):
        message.stamp_from(&id("v1"));

        // then (期待する結果):
        assert_eq!(message.from(), Some("v1"));
        assert_eq!(
            message.to_value(),
            json!({"to": "r", "from": "v1", "sdp": "x"})
        );
    }
}
