pub mod auth;
pub mod health;
pub mod loan;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// POST /register              register
/// POST /login                 login (sets the jwt cookie)
/// GET  /logout                logout (clears it)
///
/// POST /loan/apply-loan       apply (auth)
/// PUT  /loan/approve-loan     approve (auth, admin)
/// PUT  /loan/reject-loan      reject (auth, admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/loan", loan::router())
}
