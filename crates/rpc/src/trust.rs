//! Service-to-service trust gate.
//!
//! Every RPC route sits behind [`require_trust`], which hands the request
//! headers to an [`Authenticator`] and rejects with 401 before the handler
//! runs. The gate authenticates the calling service only; it injects nothing
//! into the request.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrustError {
    #[error("no auth token provided")]
    Missing,

    #[error("invalid auth token format")]
    Malformed,

    #[error("invalid auth token")]
    Invalid,
}

impl IntoResponse for TrustError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.to_string(),
            "code": "UNAUTHENTICATED",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Decides whether an inbound call comes from inside the trust boundary.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Result<(), TrustError>;
}

/// Accepts `authorization: Bearer <secret>` for one process-wide secret.
pub struct SharedSecretAuthenticator {
    secret: String,
}

impl SharedSecretAuthenticator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl Authenticator for SharedSecretAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<(), TrustError> {
        let value = headers.get(AUTHORIZATION).ok_or(TrustError::Missing)?;
        let value = value.to_str().map_err(|_| TrustError::Malformed)?;
        let token = value
            .strip_prefix(BEARER_PREFIX)
            .ok_or(TrustError::Malformed)?;

        if token != self.secret {
            return Err(TrustError::Invalid);
        }
        Ok(())
    }
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn require_trust(
    State(authenticator): State<Arc<dyn Authenticator>>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(err) = authenticator.authenticate(request.headers()) {
        tracing::warn!(path = %request.uri().path(), reason = %err, "Rejected untrusted RPC call");
        return err.into_response();
    }
    next.run(request).await
}
