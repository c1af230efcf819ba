//! アクセストークンストア
//!
//! トークン → 発行元ロボットの接続 ID。

use std::collections::HashMap;

use super::value_object::{AccessToken, ConnectionId};

#[derive(Debug, Default)]
pub struct AccessTokenStore {
    tokens: HashMap<AccessToken, ConnectionId>,
}

impl AccessTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// トークンを保存する
    ///
    /// 同じトークンが別のロボットに紐づいている場合は何も変更せず `false` を返す。
    pub fn insert(&mut self, token: AccessToken, robot_id: ConnectionId) -> bool {
        match self.tokens.get(&token) {
            Some(issuer) if issuer != &robot_id => false,
            _ => {
                self.tokens.insert(token, robot_id);
                true
            }
        }
    }

    pub fn resolve(&self, token: &AccessToken) -> Option<&ConnectionId> {
        self.tokens.get(token)
    }

    pub fn remove(&mut self, token: &AccessToken) -> Option<ConnectionId> {
        self.tokens.remove(token)
    }

    /// 指定したロボットが発行した全トークンを破棄し、破棄した件数を返す
    pub fn revoke_for(&mut self, robot_id: &ConnectionId) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, issuer| issuer != robot_id);
        before - self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
