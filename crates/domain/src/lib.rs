//! 论坛聊天功能核心领域模型
//!
//! 包含房间、消息、成员投影等实体，以及面向用户的错误码。

pub mod errors;
pub mod message;
pub mod room;
pub mod value_objects;

pub use errors::{ChatError, DomainResult};
pub use message::{ChatMessage, MessageDraft};
pub use room::{RoomData, RoomUser};
pub use value_objects::{
    escape_html, MessageContent, MessageId, RoomId, RoomName, Timestamp, UserId,
};
