//! 通知通道的内存实现。
//!
//! 每个在线用户一条 broadcast 通道，WebSocket 层订阅后把事件
//! 透传给客户端。不在线（未订阅）的用户直接跳过，没有离线补偿。

use std::collections::HashMap;
use std::sync::RwLock;

use application::{NotifyError, RealtimeNotifier};
use async_trait::async_trait;
use domain::UserId;
use tokio::sync::broadcast;

/// 推送给单个用户的事件信封
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NotificationEnvelope {
    pub event: String,
    pub payload: serde_json::Value,
}

/// 按用户分发的进程内通知器
pub struct ChannelNotifier {
    capacity: usize,
    channels: RwLock<HashMap<UserId, broadcast::Sender<NotificationEnvelope>>>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// 订阅某个用户的事件流（用户上线时调用）
    pub fn subscribe(&self, uid: UserId) -> broadcast::Receiver<NotificationEnvelope> {
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        channels
            .entry(uid)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// 回收没有任何订阅者的通道
    pub fn prune(&self) {
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        channels.retain(|_, sender| sender.receiver_count() > 0);
    }
}

#[async_trait]
impl RealtimeNotifier for ChannelNotifier {
    async fn emit_to_uids(
        &self,
        event: String,
        payload: serde_json::Value,
        uids: Vec<UserId>,
    ) -> Result<(), NotifyError> {
        let channels = self
            .channels
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for uid in uids {
            let Some(sender) = channels.get(&uid) else {
                continue; // 用户不在线
            };
            if sender.receiver_count() == 0 {
                continue;
            }
            let envelope = NotificationEnvelope {
                event: event.clone(),
                payload: payload.clone(),
            };
            if let Err(err) = sender.send(envelope) {
                tracing::debug!(uid = %uid, error = %err, "事件投递失败，订阅端已关闭");
            }
        }
        Ok(())
    }
}
