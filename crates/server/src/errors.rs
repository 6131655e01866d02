use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::wire::ErrorBody;

/// Error response; the body shape differs per endpoint family.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    /// `{"message": ..}` as used by auth, task and item endpoints.
    pub fn message(status: StatusCode, msg: impl Into<String>) -> Self {
        Self { status, body: ErrorBody::message(msg) }
    }

    /// `{"error": ..}` as used by event and user endpoints.
    pub fn error(status: StatusCode, msg: impl Into<String>) -> Self {
        Self { status, body: ErrorBody::error(msg) }
    }

    pub fn unauthorized() -> Self {
        Self::message(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
