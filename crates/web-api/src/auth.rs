//! 调用者提取。
//!
//! 从 Authorization: Bearer <token> 解析会话，组装应用层的调用者
//! 上下文。来源 IP 取自 X-Forwarded-For 的第一跳，缺失时为 None。

use application::Caller;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{error::ApiError, state::AppState};

/// 已通过会话校验的调用者
pub struct AuthedCaller(pub Caller);

impl FromRequestParts<AppState> for AuthedCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
        let (uid, session) = state
            .sessions
            .resolve(token)
            .ok_or_else(|| ApiError::unauthorized("invalid or expired session"))?;

        let ip = client_ip(parts);
        Ok(Self(Caller::from_request(uid, ip, session)))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn client_ip(parts: &Parts) -> Option<String> {
    let forwarded = parts.headers.get("x-forwarded-for")?.to_str().ok()?;
    let first_hop = forwarded.split(',').next()?.trim();
    if first_hop.is_empty() {
        None
    } else {
        Some(first_hop.to_string())
    }
}
