//! Session-cookie authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use loanhub_core::error::CoreError;
use loanhub_core::types::RecordId;
use loanhub_rpc::messages::VerifyTokenRequest;

use crate::error::AppError;
use crate::state::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "jwt";

/// Authenticated user resolved from the `jwt` cookie.
///
/// Every extraction asks the identity service to verify the token, so a
/// handler taking `AuthUser` never runs for an unauthenticated caller:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: RecordId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Unauthorized: No JWT token provided".into(),
                ))
            })?;

        let verified = state
            .identity
            .verify_token(VerifyTokenRequest { token })
            .await?;

        Ok(AuthUser {
            user_id: verified.payload.user_id,
        })
    }
}
