//! 应用层实现。
//!
//! 这里是聊天 API 的请求编排层：校验调用者会话、执行限流，
//! 然后把实际工作委托给外部协作方的端口抽象
//! （消息子系统、用户子系统、插件挂钩、实时通知）。

pub mod caller;
pub mod clock;
pub mod error;
pub mod gateway;
pub mod hooks;
pub mod notifier;
pub mod rate_limiter;
pub mod services;

pub use caller::{Caller, ChatSession, RequestContext};
pub use clock::{Clock, SystemClock};
pub use error::ApplicationError;
pub use gateway::{GatewayError, MessagingGateway, RoomMemberRecord, UserGateway};
pub use hooks::{HookError, MessageHooks, OutgoingMessage, PassthroughHooks};
pub use notifier::{
    NotifyError, RealtimeNotifier, RoomRenameEvent, EVENT_CHAT_RECEIVE, EVENT_ROOM_RENAME,
};
pub use rate_limiter::{MessageRateLimiter, RateLimitError};
pub use services::{
    ChatsService, ChatsServiceDependencies, CreateRoomRequest, InviteUsersRequest,
    KickUsersRequest, PostMessageRequest, RenameRoomRequest,
};
