//! 消息限流器。
//!
//! 同一会话两次发消息之间必须间隔一个配置的最小延迟，
//! 状态就是会话里的单个时间戳：通过检查时推进到本次时间，
//! 被拒绝的检查不改动任何状态。会话从未发过消息时首次检查必然通过。

use std::sync::Arc;

use crate::caller::Caller;
use crate::clock::Clock;

/// 限流错误类型
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit exceeded: wait {remaining_millis}ms before sending again")]
    Exceeded { remaining_millis: i64 },
}

/// 消息限流器
pub struct MessageRateLimiter {
    /// 两次发送之间的最小间隔（毫秒）
    min_delay_millis: i64,
    clock: Arc<dyn Clock>,
}

impl MessageRateLimiter {
    pub fn new(min_delay_millis: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_delay_millis: min_delay_millis as i64,
            clock,
        }
    }

    /// 检查调用者是否可以发送消息
    pub fn check_message_rate(&self, caller: &Caller) -> Result<(), RateLimitError> {
        let session = caller.session();
        let now = self.clock.now_millis();
        if session.check_and_touch(now, self.min_delay_millis) {
            return Ok(());
        }
        let elapsed = now - session.last_message_millis();
        Err(RateLimitError::Exceeded {
            remaining_millis: (self.min_delay_millis - elapsed).max(0),
        })
    }
}
