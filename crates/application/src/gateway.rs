//! 外部协作方端口。
//!
//! 消息子系统与用户子系统都不在本服务内实现，这里只定义
//! 委托契约：房间的创建/查询/改名、消息落库、成员查询与增删、
//! 权限检查，以及用户存在性与在线状态。

use async_trait::async_trait;
use domain::{ChatMessage, MessageDraft, RoomData, RoomId, RoomName, UserId};

/// 端口调用错误
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("user {uid} is not in room {room_id}")]
    NotInRoom { uid: UserId, room_id: RoomId },

    #[error("messaging not allowed: {reason}")]
    NotAllowed { reason: String },

    #[error("messaging backend error: {0}")]
    Backend(String),
}

impl GatewayError {
    pub fn not_allowed(reason: impl Into<String>) -> Self {
        Self::NotAllowed {
            reason: reason.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// 房间成员记录，由消息子系统返回。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoomMemberRecord {
    pub uid: UserId,
    pub username: String,
}

/// 消息子系统端口。
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// 检查 from 是否允许私聊 to（拉黑、权限组等规则在子系统内）
    async fn can_message_user(&self, from: UserId, to: UserId) -> Result<(), GatewayError>;

    /// 检查 uid 是否允许向房间发消息
    async fn can_message_room(&self, uid: UserId, room_id: RoomId) -> Result<(), GatewayError>;

    /// 创建房间并把 owner 与受邀用户加入，返回新房间标识
    async fn new_room(&self, owner: UserId, invited: Vec<UserId>) -> Result<RoomId, GatewayError>;

    async fn room_data(&self, room_id: RoomId) -> Result<RoomData, GatewayError>;

    /// 以 uid 的视角加载房间（未读数等按人计算的字段由子系统处理）
    async fn load_room(&self, uid: UserId, room_id: RoomId) -> Result<RoomData, GatewayError>;

    async fn rename_room(
        &self,
        uid: UserId,
        room_id: RoomId,
        name: RoomName,
    ) -> Result<(), GatewayError>;

    async fn uids_in_room(&self, room_id: RoomId) -> Result<Vec<UserId>, GatewayError>;

    async fn users_in_room(&self, room_id: RoomId)
        -> Result<Vec<RoomMemberRecord>, GatewayError>;

    async fn is_room_owner(&self, uid: UserId, room_id: RoomId) -> Result<bool, GatewayError>;

    async fn user_count_in_room(&self, room_id: RoomId) -> Result<usize, GatewayError>;

    async fn add_users_to_room(
        &self,
        actor: UserId,
        uids: Vec<UserId>,
        room_id: RoomId,
    ) -> Result<(), GatewayError>;

    async fn remove_users_from_room(
        &self,
        actor: UserId,
        uids: Vec<UserId>,
        room_id: RoomId,
    ) -> Result<(), GatewayError>;

    /// 用户主动退出，与被踢走的审计路径不同
    async fn leave_room(&self, uids: Vec<UserId>, room_id: RoomId) -> Result<(), GatewayError>;

    /// 持久化消息并返回存储后的完整记录
    async fn send_message(&self, draft: MessageDraft) -> Result<ChatMessage, GatewayError>;

    /// 向房间内所有成员推送新消息
    async fn notify_users_in_room(
        &self,
        sender: UserId,
        room_id: RoomId,
        message: ChatMessage,
    ) -> Result<(), GatewayError>;
}

/// 用户子系统端口。
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserGateway: Send + Sync {
    /// 批量存在性检查，返回与入参等长的布尔序列
    async fn exists(&self, uids: Vec<UserId>) -> Result<Vec<bool>, GatewayError>;

    /// 刷新用户的在线状态
    async fn mark_online(&self, uid: UserId) -> Result<(), GatewayError>;
}
