//! 插件挂钩点。
//!
//! 对应原论坛的 filter:messaging.send 挂钩：第三方插件可以在
//! 消息发出前改写其内容，或直接拒绝发送。插件系统本身是外部
//! 协作方，这里只保留拦截点的契约。

use async_trait::async_trait;
use domain::{RoomId, UserId};

/// 待发送消息的挂钩载荷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub uid: UserId,
    pub room_id: RoomId,
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("hook rejected message: {0}")]
    Rejected(String),

    #[error("hook failed: {0}")]
    Failed(String),
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessageHooks: Send + Sync {
    /// 发送前过滤，返回（可能被改写过的）载荷
    async fn filter_outgoing(
        &self,
        message: OutgoingMessage,
    ) -> Result<OutgoingMessage, HookError>;
}

/// 未注册任何插件时的透传实现
#[derive(Debug, Default)]
pub struct PassthroughHooks;

#[async_trait]
impl MessageHooks for PassthroughHooks {
    async fn filter_outgoing(
        &self,
        message: OutgoingMessage,
    ) -> Result<OutgoingMessage, HookError> {
        Ok(message)
    }
}
