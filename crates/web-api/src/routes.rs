use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use application::{
    CreateRoomRequest, InviteUsersRequest, KickUsersRequest, PostMessageRequest,
    RenameRoomRequest,
};
use domain::{ChatMessage, RoomData, RoomUser};

use crate::{auth::AuthedCaller, error::ApiError, state::AppState, websocket};

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    username: String,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    uid: Uuid,
    token: String,
}

#[derive(Debug, Deserialize)]
struct CreateRoomPayload {
    /// 缺失与空列表是两回事：缺失按参数类型错误处理
    uids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
struct PostMessagePayload {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RenameRoomPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RoomUsersPayload {
    uids: Option<Vec<Uuid>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v3", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/chats", post(create_room))
        .route("/chats/{room_id}", post(post_message).put(rename_room))
        .route(
            "/chats/{room_id}/users",
            get(room_users).post(invite_users).delete(kick_users),
        )
        .route("/ws", get(websocket::upgrade))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// 注册用户并签发会话 token。
///
/// 用户体系本属论坛主体，这个入口只是内存目录的配套，
/// 让整条链路可以独立跑起来。
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("username: must not be empty"));
    }

    let uid = state.directory.register(username);
    let token = state.sessions.issue(uid);
    tracing::info!(uid = %uid, username, "用户注册");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { uid: uid.0, token }),
    ))
}

async fn create_room(
    State(state): State<AppState>,
    AuthedCaller(caller): AuthedCaller,
    Json(payload): Json<CreateRoomPayload>,
) -> Result<(StatusCode, Json<RoomData>), ApiError> {
    let room = state
        .chats
        .create(&caller, CreateRoomRequest { uids: payload.uids })
        .await?;

    Ok((StatusCode::CREATED, Json(room)))
}

async fn post_message(
    State(state): State<AppState>,
    AuthedCaller(caller): AuthedCaller,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<PostMessagePayload>,
) -> Result<Json<ChatMessage>, ApiError> {
    let message = state
        .chats
        .post(
            &caller,
            PostMessageRequest {
                room_id,
                message: payload.message,
            },
        )
        .await?;

    Ok(Json(message))
}

async fn rename_room(
    State(state): State<AppState>,
    AuthedCaller(caller): AuthedCaller,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<RenameRoomPayload>,
) -> Result<Json<RoomData>, ApiError> {
    let room = state
        .chats
        .rename(
            &caller,
            RenameRoomRequest {
                room_id,
                name: payload.name,
            },
        )
        .await?;

    Ok(Json(room))
}

async fn room_users(
    State(state): State<AppState>,
    AuthedCaller(caller): AuthedCaller,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<RoomUser>>, ApiError> {
    let users = state.chats.users(&caller, room_id).await?;
    Ok(Json(users))
}

async fn invite_users(
    State(state): State<AppState>,
    AuthedCaller(caller): AuthedCaller,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<RoomUsersPayload>,
) -> Result<Json<Vec<RoomUser>>, ApiError> {
    let users = state
        .chats
        .invite(
            &caller,
            InviteUsersRequest {
                room_id,
                uids: payload.uids,
            },
        )
        .await?;

    Ok(Json(users))
}

async fn kick_users(
    State(state): State<AppState>,
    AuthedCaller(caller): AuthedCaller,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<RoomUsersPayload>,
) -> Result<Json<Vec<RoomUser>>, ApiError> {
    let users = state
        .chats
        .kick(
            &caller,
            KickUsersRequest {
                room_id,
                uids: payload.uids,
            },
        )
        .await?;

    Ok(Json(users))
}
