use crate::value_objects::{MessageContent, MessageId, RoomId, Timestamp, UserId};

/// 已持久化的聊天消息，由消息子系统返回。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub timestamp: Timestamp,
    #[serde(skip_serializing)] // 发送方 IP 只做审计，不暴露给客户端
    pub ip: Option<String>,
}

/// 待发送消息，`post` 操作交给消息子系统的入参。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub sender_id: UserId,
    pub room_id: RoomId,
    pub content: MessageContent,
    pub timestamp: Timestamp,
    pub ip: Option<String>,
}
