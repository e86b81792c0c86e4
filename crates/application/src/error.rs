use domain::ChatError;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::hooks::HookError;
use crate::notifier::NotifyError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("chat error: {0}")]
    Chat(#[from] ChatError),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("hook error: {0}")]
    Hook(#[from] HookError),
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),
}

impl ApplicationError {
    /// 面向用户的错误码，传输层原样下发
    pub fn code(&self) -> &'static str {
        match self {
            Self::Chat(err) => err.code(),
            Self::Gateway(GatewayError::RoomNotFound(_)) => "chat-room-does-not-exist",
            Self::Gateway(GatewayError::UserNotFound(_)) => "no-user",
            Self::Gateway(GatewayError::NotInRoom { .. }) => "not-in-room",
            Self::Gateway(GatewayError::NotAllowed { .. }) => "chat-restricted",
            Self::Gateway(GatewayError::Backend(_)) => "internal-error",
            Self::Hook(_) => "invalid-data",
            Self::Notify(_) => "internal-error",
        }
    }
}
