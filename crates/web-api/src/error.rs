use application::{ApplicationError, GatewayError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::ChatError;
use serde::Serialize;

/// 下发给客户端的错误体，`code` 与原论坛的错误码保持一致。
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "not-authorized", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid-data", message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal-error", message)
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        let status = match &error {
            ApplicationError::Chat(ChatError::TooManyMessages) => StatusCode::TOO_MANY_REQUESTS,
            ApplicationError::Chat(_) => StatusCode::BAD_REQUEST,
            ApplicationError::Gateway(GatewayError::RoomNotFound(_)) => StatusCode::NOT_FOUND,
            ApplicationError::Gateway(GatewayError::UserNotFound(_)) => StatusCode::BAD_REQUEST,
            ApplicationError::Gateway(GatewayError::NotInRoom { .. })
            | ApplicationError::Gateway(GatewayError::NotAllowed { .. }) => StatusCode::FORBIDDEN,
            ApplicationError::Gateway(GatewayError::Backend(_)) | ApplicationError::Notify(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApplicationError::Hook(_) => StatusCode::BAD_REQUEST,
        };
        ApiError::new(status, error.code(), error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
