use std::sync::Arc;

use loanhub_rpc::api::{IdentityApi, LoanApi};

use crate::config::GatewayConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityApi>,
    pub loans: Arc<dyn LoanApi>,
    pub config: Arc<GatewayConfig>,
}
