//! Route definitions for the `/loan` resource.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::loan;
use crate::state::AppState;

/// Routes mounted at `/loan`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/apply-loan", post(loan::apply_loan))
        .route("/approve-loan", put(loan::approve_loan))
        .route("/reject-loan", put(loan::reject_loan))
}
