//! Handlers for registration and the cookie session (login, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use cookie::time::Duration;
use loanhub_rpc::messages::{LoginRequest, RegisterRequest, RegisteredUser};
use serde::Deserialize;
use validator::Validate;

use crate::config::GatewayConfig;
use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::auth::SESSION_COOKIE;
use crate::response::{relay, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/register`.
///
/// Blank fields are passed through; the identity service reports them.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Request body for `POST /api/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterBody>,
) -> AppResult<(StatusCode, Json<MessageResponse<RegisteredUser>>)> {
    let success = state
        .identity
        .register(RegisterRequest {
            username: body.username,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;

    tracing::info!(user_id = %success.payload.user_id, "User registered");
    Ok(relay(success))
}

/// POST /api/login
///
/// On success the session token is set as the `jwt` cookie; it is never
/// returned in the body.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<LoginBody>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    let success = state
        .identity
        .login(LoginRequest {
            username: body.username,
            password: body.password,
        })
        .await?;

    let mut cookie = session_cookie(&state.config, success.payload.token);
    cookie.set_max_age(Duration::seconds(success.payload.expires_in));

    Ok((jar.add(cookie), Json(MessageResponse::message(success.message))))
}

/// GET /api/logout
///
/// Always answers with an expired `jwt` cookie, whether or not the request
/// carried one. Tokens are stateless, so nothing is revoked server-side.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let mut cookie = session_cookie(&state.config, String::new());
    cookie.make_removal();
    (jar.add(cookie), Json(MessageResponse::message("Logged out successfully")))
}

/// Session cookie with the attributes shared by login and logout. Removal
/// only works when path and domain match the original.
fn session_cookie(config: &GatewayConfig, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .build();
    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}
