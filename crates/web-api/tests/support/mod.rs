use std::sync::Arc;

use application::{
    ChatsService, ChatsServiceDependencies, Clock, MessageRateLimiter, PassthroughHooks,
    RealtimeNotifier, SystemClock,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use infrastructure::{
    ChannelNotifier, InMemoryMessaging, InMemorySessionStore, InMemoryUserDirectory,
};
use serde_json::Value;
use tower::ServiceExt;
use web_api::{router, AppState};

/// 在内存适配器上组装完整路由
pub fn build_app(message_delay_ms: u64, max_room_users: Option<usize>) -> Router {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let directory = Arc::new(InMemoryUserDirectory::new(clock.clone()));
    let notifier = Arc::new(ChannelNotifier::new(64));
    let messaging = Arc::new(InMemoryMessaging::new(
        directory.clone(),
        notifier.clone() as Arc<dyn RealtimeNotifier>,
        clock.clone(),
    ));
    let rate_limiter = Arc::new(MessageRateLimiter::new(message_delay_ms, clock.clone()));

    let chats = Arc::new(ChatsService::new(ChatsServiceDependencies {
        messaging,
        users: directory.clone(),
        hooks: Arc::new(PassthroughHooks),
        notifier: notifier.clone(),
        clock,
        rate_limiter,
        max_room_users,
    }));

    let sessions = Arc::new(InMemorySessionStore::new());
    let state = AppState::new(chats, sessions, directory, notifier);

    router(state)
}

/// 发送一次 JSON 请求，返回状态码与响应体
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// 注册用户，返回 (uid, token)
pub async fn register(router: &Router, username: &str) -> (String, String) {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/v3/auth/register",
        None,
        Some(serde_json::json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (
        body["uid"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}
