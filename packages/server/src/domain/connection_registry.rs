//! 接続レジストリ
//!
//! 生きている接続 ID とそのロールの対応表。ロールの参照・変更はここを経由します。

use std::collections::HashMap;

use super::{
    entity::{RobotSession, Role, ViewerRef},
    error::BrokerError,
    value_object::{ConnectionId, Timestamp},
};

/// レジストリの 1 エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub role: Role,
    pub connected_at: Timestamp,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しい接続を `Unbound` として登録
    pub fn insert(&mut self, id: ConnectionId, connected_at: Timestamp) -> Result<(), BrokerError> {
        if self.entries.contains_key(&id) {
            return Err(BrokerError::DuplicateConnection(id));
        }
        self.entries.insert(
            id,
            ConnectionEntry {
                role: Role::Unbound,
                connected_at,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, id: &ConnectionId) -> Option<ConnectionEntry> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&ConnectionEntry> {
        self.entries.get(id)
    }

    /// 呼び出し元のロールを取得
    pub fn role(&self, id: &ConnectionId) -> Result<&Role, BrokerError> {
        self.entries
            .get(id)
            .map(|entry| &entry.role)
            .ok_or_else(|| BrokerError::UnknownConnection(id.clone()))
    }

    /// 文字列の ID で生きている接続を探す
    pub fn find_live(&self, raw_id: &str) -> Option<ConnectionId> {
        let id = ConnectionId::new(raw_id.to_string()).ok()?;
        self.entries.contains_key(&id).then_some(id)
    }

    /// `Unbound` の接続にロールを割り当てる
    pub fn bind(&mut self, id: &ConnectionId, role: Role) -> Result<(), BrokerError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| BrokerError::UnknownConnection(id.clone()))?;
        if !entry.role.is_unbound() {
            return Err(BrokerError::AlreadyBound {
                id: id.clone(),
                role: entry.role.name(),
            });
        }
        entry.role = role;
        Ok(())
    }

    /// 呼び出し元が Unbound であることを確認
    pub fn ensure_unbound(&self, id: &ConnectionId) -> Result<(), BrokerError> {
        let role = self.role(id)?;
        if role.is_unbound() {
            Ok(())
        } else {
            Err(BrokerError::AlreadyBound {
                id: id.clone(),
                role: role.name(),
            })
        }
    }

    /// ロボットとして生きている接続のセッション
    pub fn robot_session(&self, id: &ConnectionId) -> Option<&RobotSession> {
        match self.entries.get(id).map(|entry| &entry.role) {
            Some(Role::Robot(session)) => Some(session),
            _ => None,
        }
    }

    pub fn robot_session_mut(&mut self, id: &ConnectionId) -> Option<&mut RobotSession> {
        match self.entries.get_mut(id).map(|entry| &mut entry.role) {
            Some(Role::Robot(session)) => Some(session),
            _ => None,
        }
    }

    pub fn viewer(&self, id: &ConnectionId) -> Option<&ViewerRef> {
        match self.entries.get(id).map(|entry| &entry.role) {
            Some(Role::Viewer(viewer)) => Some(viewer),
            _ => None,
        }
    }

    /// 全エントリ（順序は不定）
    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &ConnectionEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
