//! 插件过滤链。
//!
//! 把注册的过滤器按顺序串起来，任何一个拒绝则整体拒绝。
//! 插件的加载与生命周期由外部插件系统负责，这里只是挂钩点的落地。

use std::sync::Arc;

use application::{HookError, MessageHooks, OutgoingMessage};
use async_trait::async_trait;

/// 顺序执行的过滤器链
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn MessageHooks>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, filter: Arc<dyn MessageHooks>) {
        self.filters.push(filter);
    }
}

#[async_trait]
impl MessageHooks for FilterChain {
    async fn filter_outgoing(
        &self,
        mut message: OutgoingMessage,
    ) -> Result<OutgoingMessage, HookError> {
        for filter in &self.filters {
            message = filter.filter_outgoing(message).await?;
        }
        Ok(message)
    }
}
