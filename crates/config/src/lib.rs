//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - 服务监听地址
//! - 聊天限流与房间容量设置

use serde::{Deserialize, Serialize};
use std::env;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务配置
    pub server: ServerConfig,
    /// 聊天设置
    pub chat: ChatConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 聊天设置
///
/// 对应原论坛配置项 chatMessageDelay 与 maximumUsersInChatRoom。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// 同一会话两次发消息之间的最小间隔（毫秒）
    pub message_delay_ms: u64,
    /// 单个房间的成员数上限，0 表示不限制
    pub max_room_users: usize,
}

impl ChatConfig {
    /// 房间容量上限，0 视为未配置
    pub fn max_room_users_limit(&self) -> Option<usize> {
        if self.max_room_users == 0 {
            None
        } else {
            Some(self.max_room_users)
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置，全部配置项都有安全的默认值
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
            },
            chat: ChatConfig {
                message_delay_ms: env::var("CHAT_MESSAGE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(200),
                max_room_users: env::var("CHAT_MAX_ROOM_USERS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
            },
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::InvalidServerConfig(
                "server host cannot be empty".to_string(),
            ));
        }

        // 限流间隔过大基本是单位写错（秒当成毫秒）
        if self.chat.message_delay_ms > 60_000 {
            return Err(ConfigError::InvalidChatConfig(
                "message delay above 60s, check CHAT_MESSAGE_DELAY_MS unit".to_string(),
            ));
        }

        if self.chat.max_room_users == 1 {
            return Err(ConfigError::InvalidChatConfig(
                "a chat room limited to a single user is useless".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServerConfig(String),
    #[error("Invalid chat configuration: {0}")]
    InvalidChatConfig(String),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),
}
