//! 用户目录的内存实现。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use application::{Clock, GatewayError, UserGateway};
use async_trait::async_trait;
use domain::{Timestamp, UserId};

#[derive(Debug, Clone)]
struct UserRecord {
    username: String,
    last_online: Option<Timestamp>,
}

/// 用户子系统端口的内存实现，只存用户名与最近在线时间。
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserDirectory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// 注册用户，返回其标识
    pub fn register(&self, username: impl Into<String>) -> UserId {
        let uid = UserId::new(uuid::Uuid::new_v4());
        self.users
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(
                uid,
                UserRecord {
                    username: username.into(),
                    last_online: None,
                },
            );
        uid
    }

    pub fn username(&self, uid: UserId) -> Option<String> {
        self.users
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&uid)
            .map(|record| record.username.clone())
    }
}

#[async_trait]
impl UserGateway for InMemoryUserDirectory {
    async fn exists(&self, uids: Vec<UserId>) -> Result<Vec<bool>, GatewayError> {
        let users = self
            .users
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(uids.iter().map(|uid| users.contains_key(uid)).collect())
    }

    async fn mark_online(&self, uid: UserId) -> Result<(), GatewayError> {
        let mut users = self
            .users
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match users.get_mut(&uid) {
            Some(record) => {
                record.last_online = Some(self.clock.now());
                Ok(())
            }
            None => Err(GatewayError::UserNotFound(uid)),
        }
    }
}
