//! Broker 集約
//!
//! 接続レジストリとアクセストークンストアを所有し、登録・トークン発行・ルーム参加・
//! 中継の認可・切断時の後始末を同期的な状態遷移として実装します。
//!
//! 通知の送信は行いません。各操作は「誰に何を通知すべきか」を戻り値で返し、
//! 実際の送信は UseCase 層が担当します。

use super::{
    access_token_store::AccessTokenStore,
    connection_registry::ConnectionRegistry,
    entity::{RobotSession, Role, SignalingMessage, ViewerRef},
    error::BrokerError,
    policy::{SessionPolicy, TokenPolicy},
    value_object::{AccessToken, ConnectionId, Timestamp},
};

/// ルーム参加の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    pub viewer: ViewerRef,
    /// 参加前から居たビューア（参加順）
    pub siblings: Vec<ConnectionId>,
}

impl JoinedRoom {
    /// `viewer_add` の通知先: ロボット → 既存ビューア（参加順）
    pub fn notify_targets(&self) -> Vec<ConnectionId> {
        let mut targets = Vec::with_capacity(self.siblings.len() + 1);
        targets.push(self.viewer.robot_id.clone());
        targets.extend(self.siblings.iter().cloned());
        targets
    }
}

/// 認可済みの中継経路
#[derive(Debug, Clone, PartialEq)]
pub struct RelayRoute {
    pub receiver: ConnectionId,
    /// `from` がスタンプ済みのメッセージ
    pub message: SignalingMessage,
}

/// 切断した接続の後始末の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// レジストリに存在しなかった（既に後始末済み）
    Unknown,
    Unbound,
    Viewer {
        viewer: ViewerRef,
        /// `viewer_left` の通知先。ロボットが既に居なければ空
        notify_targets: Vec<ConnectionId>,
    },
    Robot {
        robot_id: ConnectionId,
        nickname: String,
        /// `robot_disconnected` の通知先（参加順）
        viewers: Vec<ConnectionId>,
        revoked_tokens: usize,
    },
}

impl Departure {
    pub fn notify_targets(&self) -> Vec<ConnectionId> {
        match self {
            Departure::Unknown | Departure::Unbound => Vec::new(),
            Departure::Viewer { notify_targets, .. } => notify_targets.clone(),
            Departure::Robot { viewers, .. } => viewers.clone(),
        }
    }
}

/// デバッグ用のロボット概要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotSummary {
    pub id: ConnectionId,
    pub nickname: String,
    pub viewers: Vec<ViewerRef>,
    pub connected_at: Timestamp,
}

/// ブローカー全体のスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerSnapshot {
    /// 接続時刻順
    pub robots: Vec<RobotSummary>,
    pub connection_count: usize,
    pub unbound_count: usize,
    pub viewer_count: usize,
    pub access_token_count: usize,
}

#[derive(Debug, Default)]
pub struct Broker {
    policy: SessionPolicy,
    connections: ConnectionRegistry,
    access_tokens: AccessTokenStore,
}

impl Broker {
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            policy,
            connections: ConnectionRegistry::new(),
            access_tokens: AccessTokenStore::new(),
        }
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    pub fn access_tokens(&self) -> &AccessTokenStore {
        &self.access_tokens
    }

    pub fn connect(&mut self, id: ConnectionId, connected_at: Timestamp) -> Result<(), BrokerError> {
        self.connections.insert(id, connected_at)
    }

    /// Unbound の接続をロボットとして登録
    pub fn register_robot(
        &mut self,
        caller: &ConnectionId,
        nickname: Option<&str>,
    ) -> Result<RobotSession, BrokerError> {
        self.connections.ensure_unbound(caller)?;

        let nickname = non_empty(nickname)
            .ok_or_else(|| BrokerError::Validation("nickname param is mandatory".to_string()))?;

        let session = RobotSession::new(nickname.to_string());
        self.connections.bind(caller, Role::Robot(session.clone()))?;
        Ok(session)
    }

    /// ロボットが発行したトークンを保存
    ///
    /// 他のロボットが発行済みの値とは衝突として拒否する（既存の紐づけは変わらない）。
    pub fn issue_access_token(
        &mut self,
        caller: &ConnectionId,
        token: AccessToken,
    ) -> Result<(), BrokerError> {
        if self.connections.robot_session(caller).is_none() {
            return Err(BrokerError::NotARobot);
        }
        if !self.access_tokens.insert(token, caller.clone()) {
            return Err(BrokerError::TokenCollision);
        }
        Ok(())
    }

    /// アクセストークンでロボットのルームに参加
    ///
    /// 順序: トークン解決 → 名前の検証 → 上限確認 → ロール設定 → ビューア追加。
    /// いずれかで失敗した場合、状態は変更されません。
    pub fn join_room(
        &mut self,
        caller: &ConnectionId,
        access_token: Option<&str>,
        name: Option<&str>,
    ) -> Result<JoinedRoom, BrokerError> {
        self.connections.ensure_unbound(caller)?;

        let token = AccessToken::new(access_token.unwrap_or_default().to_string())?;
        let robot_id = self
            .access_tokens
            .resolve(&token)
            .cloned()
            .ok_or(BrokerError::UnknownToken)?;
        // 発行元が既に居ない古いエントリは未知のトークンと同じ扱い
        let robot = self
            .connections
            .robot_session(&robot_id)
            .ok_or(BrokerError::UnknownToken)?;

        let name = non_empty(name).ok_or_else(|| {
            BrokerError::Validation("The viewerInfo.name param is mandatory".to_string())
        })?;

        if let Some(limit) = self.policy.max_viewers_per_robot {
            if robot.viewers.len() >= limit {
                return Err(BrokerError::RobotFull {
                    nickname: robot.nickname.clone(),
                    limit,
                });
            }
        }

        let siblings = robot.viewer_ids();
        let viewer = ViewerRef::new(caller.clone(), name.to_string(), robot_id.clone());

        self.connections.bind(caller, Role::Viewer(viewer.clone()))?;
        if let Some(session) = self.connections.robot_session_mut(&robot_id) {
            session.add_viewer(viewer.clone());
        }
        if self.policy.token_policy == TokenPolicy::SingleUse {
            self.access_tokens.remove(&token);
        }

        Ok(JoinedRoom { viewer, siblings })
    }

    /// 移動・停止コマンドの宛先ロボットを解決
    pub fn command_target(&self, caller: &ConnectionId) -> Result<ConnectionId, BrokerError> {
        let Role::Viewer(viewer) = self.connections.role(caller)? else {
            return Err(BrokerError::NotPaired);
        };
        if self.connections.robot_session(&viewer.robot_id).is_none() {
            return Err(BrokerError::RobotGone(viewer.robot_id.clone()));
        }
        Ok(viewer.robot_id.clone())
    }

    /// シグナリングメッセージの中継を認可し、送信者をスタンプする
    ///
    /// ビューアは自分のロボットか同じロボットの他のビューアへ、ロボットは自分の
    /// ビューアへのみ送信できます。
    pub fn route_signaling(
        &self,
        caller: &ConnectionId,
        mut message: SignalingMessage,
    ) -> Result<RelayRoute, BrokerError> {
        let receiver = self
            .connections
            .find_live(message.to())
            .ok_or_else(|| BrokerError::UnknownReceiver(message.to().to_string()))?;

        match self.connections.role(caller)? {
            Role::Viewer(viewer) => {
                let robot = self
                    .connections
                    .robot_session(&viewer.robot_id)
                    .ok_or_else(|| BrokerError::RobotGone(viewer.robot_id.clone()))?;
                if receiver != viewer.robot_id && !robot.has_viewer(&receiver) {
                    return Err(BrokerError::UnauthorizedReceiver(receiver));
                }
            }
            Role::Robot(session) => {
                if !session.has_viewer(&receiver) {
                    return Err(BrokerError::UnauthorizedReceiver(receiver));
                }
            }
            Role::Unbound => return Err(BrokerError::Unpaired),
        }

        message.stamp_from(caller);
        Ok(RelayRoute { receiver, message })
    }

    /// 切断した接続を取り除く。失敗しない。
    pub fn disconnect(&mut self, id: &ConnectionId) -> Departure {
        let Some(entry) = self.connections.remove(id) else {
            return Departure::Unknown;
        };

        match entry.role {
            Role::Unbound => Departure::Unbound,
            Role::Viewer(viewer) => {
                let notify_targets = match self.connections.robot_session_mut(&viewer.robot_id) {
                    Some(session) => {
                        session.remove_viewer(id);
                        let mut targets = vec![viewer.robot_id.clone()];
                        targets.extend(session.viewer_ids());
                        targets
                    }
                    None => Vec::new(),
                };
                Departure::Viewer {
                    viewer,
                    notify_targets,
                }
            }
            Role::Robot(session) => {
                let revoked_tokens = self.access_tokens.revoke_for(id);
                Departure::Robot {
                    robot_id: id.clone(),
                    viewers: session.viewer_ids(),
                    nickname: session.nickname,
                    revoked_tokens,
                }
            }
        }
    }

    pub fn snapshot(&self) -> BrokerSnapshot {
        let mut robots = Vec::new();
        let mut unbound_count = 0;
        let mut viewer_count = 0;

        for (id, entry) in self.connections.iter() {
            match &entry.role {
                Role::Unbound => unbound_count += 1,
                Role::Viewer(_) => viewer_count += 1,
                Role::Robot(session) => robots.push(RobotSummary {
                    id: id.clone(),
                    nickname: session.nickname.clone(),
                    viewers: session.viewers.clone(),
                    connected_at: entry.connected_at,
                }),
            }
        }
        robots.sort_by(|a, b| {
            a.connected_at
                .cmp(&b.connected_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        BrokerSnapshot {
            robots,
            connection_count: self.connections.len(),
            unbound_count,
            viewer_count,
            access_token_count: self.access_tokens.len(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
