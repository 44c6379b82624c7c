//! Response envelope for gateway handlers.

use axum::http::StatusCode;
use axum::Json;
use loanhub_core::outcome::Success;
use serde::Serialize;

/// `{ "message": string, "data"?: T }`.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize = ()> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl MessageResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// Relay a downstream success with its own status code.
pub fn relay<T: Serialize>(success: Success<T>) -> (StatusCode, Json<MessageResponse<T>>) {
    let status = StatusCode::from_u16(success.status_code).unwrap_or(StatusCode::OK);
    (
        status,
        Json(MessageResponse {
            message: success.message,
            data: Some(success.payload),
        }),
    )
}
