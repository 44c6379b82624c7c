use loanhub_core::error::CoreError;

use crate::reply::UNEXPECTED_RESPONSE;

/// Transport-level failure of an RPC call.
///
/// Application failures never show up here; they travel inside a
/// [`Reply`](crate::reply::Reply) with HTTP 200.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Connection refused, timeout, or an undecodable body.
    #[error("RPC request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The peer answered with a non-2xx HTTP status.
    #[error("RPC call returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The configured shared secret is not a valid header value.
    #[error("Trust token is not a valid header value")]
    InvalidCredential,
}

impl From<RpcError> for CoreError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Status { status, message } => CoreError::from_status(status, message),
            RpcError::Request(_) | RpcError::InvalidCredential => {
                CoreError::Internal(UNEXPECTED_RESPONSE.into())
            }
        }
    }
}
