use std::sync::Arc;

use application::ChatsService;
use infrastructure::{ChannelNotifier, InMemorySessionStore, InMemoryUserDirectory};

#[derive(Clone)]
pub struct AppState {
    pub chats: Arc<ChatsService>,
    pub sessions: Arc<InMemorySessionStore>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub notifier: Arc<ChannelNotifier>,
}

impl AppState {
    pub fn new(
        chats: Arc<ChatsService>,
        sessions: Arc<InMemorySessionStore>,
        directory: Arc<InMemoryUserDirectory>,
        notifier: Arc<ChannelNotifier>,
    ) -> Self {
        Self {
            chats,
            sessions,
            directory,
            notifier,
        }
    }
}
