//! 会话存储的内存实现。
//!
//! 真实部署中会话由论坛主体的会话存储持有，这里只维护
//! token → (uid, 会话) 的映射，让传输层能组装调用者上下文。
//! 同一 token 的多次解析返回同一个会话对象，限流时间戳得以跨请求保留。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use application::ChatSession;
use domain::UserId;
use uuid::Uuid;

#[derive(Clone)]
struct SessionEntry {
    uid: UserId,
    session: Arc<ChatSession>,
}

/// 进程内会话存储
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, SessionEntry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为用户签发一个新的会话 token
    pub fn issue(&self, uid: UserId) -> String {
        let token = Uuid::new_v4().to_string();
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(
                token.clone(),
                SessionEntry {
                    uid,
                    session: Arc::new(ChatSession::new()),
                },
            );
        token
    }

    /// 解析 token，返回用户标识与其会话
    pub fn resolve(&self, token: &str) -> Option<(UserId, Arc<ChatSession>)> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(token)
            .map(|entry| (entry.uid, entry.session.clone()))
    }

    /// 注销会话
    pub fn revoke(&self, token: &str) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(token);
    }
}
