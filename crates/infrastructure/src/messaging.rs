//! 消息子系统端口的内存实现。
//!
//! 一个 RwLock 保护的房间注册表：成员按加入顺序保存，消息只追加。
//! 权限规则保持与真实子系统一致的最小子集：改名和移除成员要求
//! 房主身份，发消息要求成员身份。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use application::{
    Clock, GatewayError, MessagingGateway, RealtimeNotifier, RoomMemberRecord,
    EVENT_CHAT_RECEIVE,
};
use async_trait::async_trait;
use domain::{ChatMessage, MessageDraft, MessageId, RoomData, RoomId, RoomName, Timestamp, UserId};
use uuid::Uuid;

use crate::directory::InMemoryUserDirectory;

#[derive(Debug, Clone)]
struct RoomState {
    owner_id: UserId,
    name: String,
    /// 按加入顺序
    members: Vec<UserId>,
    messages: Vec<ChatMessage>,
    created_at: Timestamp,
}

impl RoomState {
    fn data(&self, room_id: RoomId) -> RoomData {
        RoomData {
            room_id,
            owner_id: self.owner_id,
            name: self.name.clone(),
            user_count: self.members.len(),
            created_at: self.created_at,
        }
    }
}

/// 进程内消息注册表
pub struct InMemoryMessaging {
    rooms: RwLock<HashMap<RoomId, RoomState>>,
    directory: Arc<InMemoryUserDirectory>,
    notifier: Arc<dyn RealtimeNotifier>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessaging {
    pub fn new(
        directory: Arc<InMemoryUserDirectory>,
        notifier: Arc<dyn RealtimeNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            directory,
            notifier,
            clock,
        }
    }

    fn with_room<T>(
        &self,
        room_id: RoomId,
        f: impl FnOnce(&RoomState) -> T,
    ) -> Result<T, GatewayError> {
        let rooms = self
            .rooms
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rooms
            .get(&room_id)
            .map(f)
            .ok_or(GatewayError::RoomNotFound(room_id))
    }

    fn with_room_mut<T>(
        &self,
        room_id: RoomId,
        f: impl FnOnce(&mut RoomState) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut rooms = self
            .rooms
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match rooms.get_mut(&room_id) {
            Some(room) => f(room),
            None => Err(GatewayError::RoomNotFound(room_id)),
        }
    }
}

#[async_trait]
impl MessagingGateway for InMemoryMessaging {
    async fn can_message_user(&self, _from: UserId, to: UserId) -> Result<(), GatewayError> {
        // 拉黑、权限组等规则属于真实子系统，这里只验证目标存在
        if self.directory.username(to).is_none() {
            return Err(GatewayError::UserNotFound(to));
        }
        Ok(())
    }

    async fn can_message_room(&self, uid: UserId, room_id: RoomId) -> Result<(), GatewayError> {
        self.with_room(room_id, |room| room.members.contains(&uid))?
            .then_some(())
            .ok_or(GatewayError::NotInRoom { uid, room_id })
    }

    async fn new_room(&self, owner: UserId, invited: Vec<UserId>) -> Result<RoomId, GatewayError> {
        let room_id = RoomId::new(Uuid::new_v4());
        let mut members = vec![owner];
        for uid in invited {
            if !members.contains(&uid) {
                members.push(uid);
            }
        }

        let mut rooms = self
            .rooms
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rooms.insert(
            room_id,
            RoomState {
                owner_id: owner,
                name: String::new(),
                members,
                messages: Vec::new(),
                created_at: self.clock.now(),
            },
        );
        Ok(room_id)
    }

    async fn room_data(&self, room_id: RoomId) -> Result<RoomData, GatewayError> {
        self.with_room(room_id, |room| room.data(room_id))
    }

    async fn load_room(&self, uid: UserId, room_id: RoomId) -> Result<RoomData, GatewayError> {
        let (is_member, data) =
            self.with_room(room_id, |room| (room.members.contains(&uid), room.data(room_id)))?;
        if !is_member {
            return Err(GatewayError::NotInRoom { uid, room_id });
        }
        Ok(data)
    }

    async fn rename_room(
        &self,
        uid: UserId,
        room_id: RoomId,
        name: RoomName,
    ) -> Result<(), GatewayError> {
        self.with_room_mut(room_id, |room| {
            if room.owner_id != uid {
                return Err(GatewayError::not_allowed("only the room owner can rename"));
            }
            room.name = name.as_str().to_owned();
            Ok(())
        })
    }

    async fn uids_in_room(&self, room_id: RoomId) -> Result<Vec<UserId>, GatewayError> {
        self.with_room(room_id, |room| room.members.clone())
    }

    async fn users_in_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<RoomMemberRecord>, GatewayError> {
        let members = self.with_room(room_id, |room| room.members.clone())?;
        Ok(members
            .into_iter()
            .map(|uid| RoomMemberRecord {
                uid,
                username: self.directory.username(uid).unwrap_or_default(),
            })
            .collect())
    }

    async fn is_room_owner(&self, uid: UserId, room_id: RoomId) -> Result<bool, GatewayError> {
        self.with_room(room_id, |room| room.owner_id == uid)
    }

    async fn user_count_in_room(&self, room_id: RoomId) -> Result<usize, GatewayError> {
        self.with_room(room_id, |room| room.members.len())
    }

    async fn add_users_to_room(
        &self,
        _actor: UserId,
        uids: Vec<UserId>,
        room_id: RoomId,
    ) -> Result<(), GatewayError> {
        self.with_room_mut(room_id, |room| {
            for uid in uids {
                if !room.members.contains(&uid) {
                    room.members.push(uid);
                }
            }
            Ok(())
        })
    }

    async fn remove_users_from_room(
        &self,
        actor: UserId,
        uids: Vec<UserId>,
        room_id: RoomId,
    ) -> Result<(), GatewayError> {
        self.with_room_mut(room_id, |room| {
            if room.owner_id != actor {
                return Err(GatewayError::not_allowed(
                    "only the room owner can remove users",
                ));
            }
            room.members.retain(|member| !uids.contains(member));
            Ok(())
        })
    }

    async fn leave_room(&self, uids: Vec<UserId>, room_id: RoomId) -> Result<(), GatewayError> {
        self.with_room_mut(room_id, |room| {
            room.members.retain(|member| !uids.contains(member));
            Ok(())
        })
    }

    async fn send_message(&self, draft: MessageDraft) -> Result<ChatMessage, GatewayError> {
        let message = ChatMessage {
            id: MessageId::new(Uuid::new_v4()),
            room_id: draft.room_id,
            sender_id: draft.sender_id,
            content: draft.content,
            timestamp: draft.timestamp,
            ip: draft.ip,
        };
        self.with_room_mut(draft.room_id, |room| {
            room.messages.push(message.clone());
            Ok(())
        })?;
        Ok(message)
    }

    async fn notify_users_in_room(
        &self,
        _sender: UserId,
        room_id: RoomId,
        message: ChatMessage,
    ) -> Result<(), GatewayError> {
        let members = self.with_room(room_id, |room| room.members.clone())?;
        let payload = serde_json::to_value(&message)
            .map_err(|err| GatewayError::backend(err.to_string()))?;
        self.notifier
            .emit_to_uids(EVENT_CHAT_RECEIVE.to_string(), payload, members)
            .await
            .map_err(|err| GatewayError::backend(err.to_string()))
    }
}
