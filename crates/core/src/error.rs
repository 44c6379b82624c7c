//! Domain error taxonomy shared by every service.
//!
//! Each variant carries the human-readable message that travels back to the
//! caller; [`CoreError::status_code`] gives the HTTP-style code the gateway
//! forwards unchanged.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Malformed identifiers, missing required fields.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing or bad credential (trust token or session token).
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated caller lacks the required role.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Record exists but is not in the state the operation expects.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A status relayed from a downstream service that has no variant above.
    #[error("Upstream error ({status_code}): {message}")]
    Upstream { status_code: u16, message: String },
}

impl CoreError {
    /// HTTP-style status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::Validation(_) => 400,
            CoreError::Unauthenticated(_) | CoreError::Unauthorized(_) => 401,
            CoreError::Forbidden(_) => 403,
            CoreError::NotFound(_) => 404,
            CoreError::Conflict(_) => 409,
            CoreError::Internal(_) => 500,
            CoreError::Upstream { status_code, .. } => *status_code,
        }
    }

    /// Stable machine-readable code, e.g. `"NOT_FOUND"`.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Unauthenticated(_) => "UNAUTHENTICATED",
            CoreError::Unauthorized(_) => "UNAUTHORIZED",
            CoreError::Forbidden(_) => "FORBIDDEN",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::Internal(_) => "INTERNAL_ERROR",
            CoreError::Upstream { .. } => "UPSTREAM_ERROR",
        }
    }

    /// The caller-facing message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            CoreError::Validation(msg)
            | CoreError::Unauthenticated(msg)
            | CoreError::Unauthorized(msg)
            | CoreError::Forbidden(msg)
            | CoreError::NotFound(msg)
            | CoreError::Conflict(msg)
            | CoreError::Internal(msg) => msg,
            CoreError::Upstream { message, .. } => message,
        }
    }

    /// Rebuild an error from a status code and message received over the wire.
    ///
    /// 401 always maps to [`CoreError::Unauthorized`]; the status code and
    /// message round-trip unchanged, which is all callers rely on.
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            400 => CoreError::Validation(message),
            401 => CoreError::Unauthorized(message),
            403 => CoreError::Forbidden(message),
            404 => CoreError::NotFound(message),
            409 => CoreError::Conflict(message),
            500 => CoreError::Internal(message),
            _ => CoreError::Upstream {
                status_code,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(CoreError::Validation("x".into()).status_code(), 400);
        assert_eq!(CoreError::Unauthenticated("x".into()).status_code(), 401);
        assert_eq!(CoreError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(CoreError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(CoreError::NotFound("x".into()).status_code(), 404);
        assert_eq!(CoreError::Conflict("x".into()).status_code(), 409);
        assert_eq!(CoreError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn from_status_preserves_code_and_message() {
        for code in [400, 401, 403, 404, 409, 500, 502, 418] {
            let err = CoreError::from_status(code, "relayed");
            assert_eq!(err.status_code(), code);
            assert_eq!(err.message(), "relayed");
        }
    }

    #[test]
    fn message_strips_variant_prefix() {
        let err = CoreError::NotFound("Loan not found".into());
        assert_eq!(err.message(), "Loan not found");
        assert_eq!(err.to_string(), "Not found: Loan not found");
    }
}
