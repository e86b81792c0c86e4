//! WebSocket 事件下发。
//!
//! 客户端带会话 token 升级连接后，订阅自己的通知通道，服务端把
//! 房间事件（新消息、改名）作为 JSON 文本帧透传。客户端到服务端
//! 只处理心跳与关闭，所有写操作走 HTTP 路由。

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use domain::UserId;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

pub async fn upgrade(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let Some((uid, _session)) = state.sessions.resolve(&query.token) else {
        return Err(ApiError::unauthorized("invalid or expired session"));
    };

    tracing::info!(uid = %uid, "WebSocket 连接升级");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, uid, state)))
}

async fn handle_socket(socket: WebSocket, uid: UserId, state: AppState) {
    let mut events = state.notifier.subscribe(uid);
    let (mut sender, mut incoming) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(envelope) => {
                        let payload = match serde_json::to_string(&envelope) {
                            Ok(json) => json,
                            Err(err) => {
                                tracing::warn!(uid = %uid, error = %err, "事件序列化失败");
                                continue;
                            }
                        };
                        if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(uid = %uid, skipped, "事件消费过慢，部分通知被丢弃");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            message = incoming.next() => {
                match message {
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(WsMessage::Ping(data))) => {
                        if sender.send(WsMessage::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        // 客户端写操作走 HTTP，这里忽略文本/二进制帧
                    }
                    Some(Err(err)) => {
                        tracing::debug!(uid = %uid, error = %err, "WebSocket 读取失败");
                        break;
                    }
                }
            }
        }
    }

    state.notifier.prune();
    tracing::info!(uid = %uid, "WebSocket 连接已断开");
}
