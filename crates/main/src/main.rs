//! 主应用程序入口
//!
//! 在内存适配器上装配聊天 API 并启动 Axum 服务。

use std::sync::Arc;

use application::{
    ChatsService, ChatsServiceDependencies, Clock, MessageRateLimiter, PassthroughHooks,
    RealtimeNotifier, SystemClock,
};
use config::AppConfig;
use infrastructure::{
    ChannelNotifier, InMemoryMessaging, InMemorySessionStore, InMemoryUserDirectory,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 读取并校验配置
    let app_config = AppConfig::from_env();
    app_config.validate()?;
    tracing::info!(
        message_delay_ms = app_config.chat.message_delay_ms,
        max_room_users = app_config.chat.max_room_users,
        "配置加载完成"
    );

    // 装配内存适配器
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let directory = Arc::new(InMemoryUserDirectory::new(clock.clone()));
    let notifier = Arc::new(ChannelNotifier::new(256));
    let messaging = Arc::new(InMemoryMessaging::new(
        directory.clone(),
        notifier.clone() as Arc<dyn RealtimeNotifier>,
        clock.clone(),
    ));
    let sessions = Arc::new(InMemorySessionStore::new());
    let rate_limiter = Arc::new(MessageRateLimiter::new(
        app_config.chat.message_delay_ms,
        clock.clone(),
    ));

    // 创建应用层服务
    let chats = Arc::new(ChatsService::new(ChatsServiceDependencies {
        messaging,
        users: directory.clone(),
        hooks: Arc::new(PassthroughHooks),
        notifier: notifier.clone(),
        clock,
        rate_limiter,
        max_room_users: app_config.chat.max_room_users_limit(),
    }));

    let state = AppState::new(chats, sessions, directory, notifier);

    // 启动 Web 服务器
    let app = router(state);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("聊天服务启动在 http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
