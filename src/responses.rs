use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Body sent along with every redirect-after-action.
#[derive(Debug, Serialize)]
pub struct Notice {
    pub message: String,
}

/// 302 to `location`, carrying `message` as a JSON notice.
pub fn found(location: &str, message: impl Into<String>) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
        Json(Notice {
            message: message.into(),
        }),
    )
        .into_response()
}

/// Like [`found`], also setting a cookie.
pub fn found_with_cookie(location: &str, cookie: String, message: impl Into<String>) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location.to_string()),
            (header::SET_COOKIE, cookie),
        ],
        Json(Notice {
            message: message.into(),
        }),
    )
        .into_response()
}

pub fn unprocessable(message: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::UNPROCESSABLE_ENTITY, message.into())
}

pub fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
