//! 领域错误定义
//!
//! 每个错误携带一个稳定的面向用户错误码，由传输层原样透传，
//! 客户端据此做本地化展示。

use thiserror::Error;

/// 聊天操作的领域错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// 消息发送频率超限
    #[error("too many messages")]
    TooManyMessages,

    /// 参数类型错误
    #[error("wrong parameter type: {field} expected {expected}, got {got}")]
    WrongParameterType {
        field: String,
        expected: String,
        got: String,
    },

    /// 房间成员数已达上限
    #[error("cannot add more users to chat room")]
    CannotAddMoreUsers,

    /// 目标用户不存在
    #[error("no such user")]
    NoUser,

    /// 参数验证失败
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

impl ChatError {
    /// 构造参数类型错误
    pub fn wrong_parameter_type(
        field: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self::WrongParameterType {
            field: field.into(),
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// 构造参数验证错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 稳定的面向用户错误码，跨版本保持不变
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooManyMessages => "too-many-messages",
            Self::WrongParameterType { .. } => "wrong-parameter-type",
            Self::CannotAddMoreUsers => "cant-add-more-users-to-chat-room",
            Self::NoUser => "no-user",
            Self::InvalidArgument { .. } => "invalid-data",
        }
    }
}

/// 领域结果类型
pub type DomainResult<T> = Result<T, ChatError>;
