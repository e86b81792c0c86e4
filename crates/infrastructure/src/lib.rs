//! 基础设施层。
//!
//! 应用层端口的内存实现：消息注册表、用户目录、会话存储、
//! 通知通道与插件过滤链。真实部署中这些端口对接独立的消息
//! 子系统与会话存储，内存实现只承担进程内运行与测试职责，
//! 不做任何持久化或投递保证。

pub mod directory;
pub mod hooks;
pub mod messaging;
pub mod notify;
pub mod sessions;

pub use directory::InMemoryUserDirectory;
pub use hooks::FilterChain;
pub use messaging::InMemoryMessaging;
pub use notify::{ChannelNotifier, NotificationEnvelope};
pub use sessions::InMemorySessionStore;
