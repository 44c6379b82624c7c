//! Server-side scaffolding shared by the three internal services.
//!
//! Each service exposes its trait object through one of the `*_routes`
//! builders, then wraps the result with [`build_service_router`] which puts
//! the trust gate on the RPC routes and the tracing/request-id stack on
//! everything.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderName;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::api::{paths, IdentityApi, LedgerApi, LoanApi};
use crate::messages::{
    ApplyLoanRequest, ApproveLoanRequest, CreateWalletRequest, CreditWalletRequest,
    GetWalletRequest, IsAdminRequest, LoanCreated, LoanDecision, LoginRequest, RegisterRequest,
    RegisteredUser, RejectLoanRequest, SessionGrant, VerifiedToken, VerifyTokenRequest,
    WalletBalance,
};
use crate::reply::Reply;
use crate::trust::{require_trust, Authenticator};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

type IdentityState = State<Arc<dyn IdentityApi>>;

pub fn identity_routes(service: Arc<dyn IdentityApi>) -> Router {
    Router::new()
        .route(paths::REGISTER, post(register))
        .route(paths::LOGIN, post(login))
        .route(paths::VERIFY_TOKEN, post(verify_token))
        .route(paths::IS_ADMIN, post(is_admin))
        .with_state(service)
}

async fn register(
    State(service): IdentityState,
    Json(request): Json<RegisterRequest>,
) -> Json<Reply<RegisteredUser>> {
    Json(service.register(request).await.into())
}

async fn login(
    State(service): IdentityState,
    Json(request): Json<LoginRequest>,
) -> Json<Reply<SessionGrant>> {
    Json(service.login(request).await.into())
}

async fn verify_token(
    State(service): IdentityState,
    Json(request): Json<VerifyTokenRequest>,
) -> Json<Reply<VerifiedToken>> {
    Json(service.verify_token(request).await.into())
}

async fn is_admin(
    State(service): IdentityState,
    Json(request): Json<IsAdminRequest>,
) -> Json<Reply<()>> {
    Json(service.is_admin(request).await.into())
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

type LedgerState = State<Arc<dyn LedgerApi>>;

pub fn ledger_routes(service: Arc<dyn LedgerApi>) -> Router {
    Router::new()
        .route(paths::CREATE_WALLET, post(create_wallet))
        .route(paths::CREDIT_WALLET, post(credit_wallet))
        .route(paths::GET_WALLET, post(get_wallet))
        .with_state(service)
}

async fn create_wallet(
    State(service): LedgerState,
    Json(request): Json<CreateWalletRequest>,
) -> Json<Reply<WalletBalance>> {
    Json(service.create_wallet(request).await.into())
}

async fn credit_wallet(
    State(service): LedgerState,
    Json(request): Json<CreditWalletRequest>,
) -> Json<Reply<WalletBalance>> {
    Json(service.credit_wallet(request).await.into())
}

async fn get_wallet(
    State(service): LedgerState,
    Json(request): Json<GetWalletRequest>,
) -> Json<Reply<WalletBalance>> {
    Json(service.get_wallet(request).await.into())
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

type LoanState = State<Arc<dyn LoanApi>>;

pub fn loan_routes(service: Arc<dyn LoanApi>) -> Router {
    Router::new()
        .route(paths::APPLY_LOAN, post(apply_loan))
        .route(paths::APPROVE_LOAN, post(approve_loan))
        .route(paths::REJECT_LOAN, post(reject_loan))
        .with_state(service)
}

async fn apply_loan(
    State(service): LoanState,
    Json(request): Json<ApplyLoanRequest>,
) -> Json<Reply<LoanCreated>> {
    Json(service.apply_loan(request).await.into())
}

async fn approve_loan(
    State(service): LoanState,
    Json(request): Json<ApproveLoanRequest>,
) -> Json<Reply<LoanDecision>> {
    Json(service.approve_loan(request).await.into())
}

async fn reject_loan(
    State(service): LoanState,
    Json(request): Json<RejectLoanRequest>,
) -> Json<Reply<LoanDecision>> {
    Json(service.reject_loan(request).await.into())
}

// ---------------------------------------------------------------------------
// Health and assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// `GET /health`, outside the trust gate so orchestrators can poll it.
pub fn health_router(service: &'static str) -> Router {
    Router::new().route(
        "/health",
        get(move || async move {
            Json(HealthResponse {
                status: "ok",
                service,
                version: env!("CARGO_PKG_VERSION"),
            })
        }),
    )
}

/// Wrap a service's RPC routes with the trust gate and the common layers.
pub fn build_service_router(
    service: &'static str,
    rpc: Router,
    authenticator: Arc<dyn Authenticator>,
) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let trusted = rpc.route_layer(middleware::from_fn_with_state(authenticator, require_trust));

    Router::new()
        .merge(health_router(service))
        .merge(trusted)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
}

/// Bind `host:port`. Port 0 picks an ephemeral port.
pub async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    let ip: IpAddr = host
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    TcpListener::bind(SocketAddr::new(ip, port)).await
}

/// Serve `app` until SIGINT or SIGTERM.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "Listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Resolves on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
