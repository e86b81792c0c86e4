//! 调用者上下文。
//!
//! 每个请求进入时由传输层组装，携带用户标识、来源 IP 与会话句柄。
//! 会话可能直接挂在调用者上（WebSocket 连接），也可能包在请求
//! 包装器里（普通 HTTP 请求），限流读取时优先取请求包装器里的那份。

use std::sync::{Arc, Mutex};

use domain::UserId;

/// 调用者会话。
///
/// 会话由外部会话存储持有并跨请求复用，这里只关心限流需要的
/// 最近一次发消息时间（epoch 毫秒，0 表示从未发送）。
#[derive(Debug, Default)]
pub struct ChatSession {
    last_chat_message_time: Mutex<i64>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一次发消息时间（epoch 毫秒）
    pub fn last_message_millis(&self) -> i64 {
        *self
            .last_chat_message_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 限流检查：距上次发送不足 min_delay_millis 时拒绝且不更新时间戳，
    /// 否则把时间戳推进到本次时间。检查与更新在同一把锁内完成。
    pub(crate) fn check_and_touch(&self, now_millis: i64, min_delay_millis: i64) -> bool {
        let mut last = self
            .last_chat_message_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if now_millis - *last < min_delay_millis {
            return false;
        }
        *last = now_millis;
        true
    }
}

/// HTTP 请求包装器，携带自己的会话引用。
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session: Arc<ChatSession>,
}

/// 经过认证的调用者上下文。
#[derive(Debug, Clone)]
pub struct Caller {
    pub uid: UserId,
    pub ip: Option<String>,
    /// HTTP 传输时存在，WebSocket 传输时为 None
    pub request: Option<RequestContext>,
    pub session: Arc<ChatSession>,
}

impl Caller {
    /// 由 HTTP 请求组装的调用者
    pub fn from_request(uid: UserId, ip: Option<String>, session: Arc<ChatSession>) -> Self {
        Self {
            uid,
            ip,
            request: Some(RequestContext {
                session: session.clone(),
            }),
            session,
        }
    }

    /// 由 WebSocket 连接组装的调用者
    pub fn from_socket(uid: UserId, ip: Option<String>, session: Arc<ChatSession>) -> Self {
        Self {
            uid,
            ip,
            request: None,
            session,
        }
    }

    /// socket 与 req 两种传输下会话挂的位置不同
    pub fn session(&self) -> &ChatSession {
        match &self.request {
            Some(request) => &request.session,
            None => &self.session,
        }
    }
}
