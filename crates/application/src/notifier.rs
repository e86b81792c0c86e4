//! 实时通知端口。
//!
//! 对应原论坛 socket.io helpers 的 emitToUids：向一组用户广播
//! 一个事件与其载荷。投递通道（长连接管理、离线补偿）由外部实现。

use async_trait::async_trait;
use domain::{RoomId, UserId};

/// 房间改名事件名
pub const EVENT_ROOM_RENAME: &str = "event:chats.roomRename";

/// 新消息事件名
pub const EVENT_CHAT_RECEIVE: &str = "event:chats.receive";

/// 房间改名事件载荷
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoomRenameEvent {
    pub room_id: RoomId,
    /// 已做 HTML 转义，客户端直接渲染
    pub new_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notify failed: {0}")]
    Failed(String),
}

impl NotifyError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RealtimeNotifier: Send + Sync {
    /// 向 uids 中的每个在线用户推送 event + payload
    async fn emit_to_uids(
        &self,
        event: String,
        payload: serde_json::Value,
        uids: Vec<UserId>,
    ) -> Result<(), NotifyError>;
}
