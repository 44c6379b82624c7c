#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderValue, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use loanhub_db::memory::{MemoryLoanStore, MemoryUserStore, MemoryWalletStore};
use loanhub_gateway::config::GatewayConfig;
use loanhub_gateway::router::build_app_router;
use loanhub_gateway::state::AppState;
use loanhub_identity::jwt::JwtConfig;
use loanhub_identity::password::PasswordConfig;
use loanhub_identity::IdentityService;
use loanhub_ledger::LedgerService;
use loanhub_loan::LoanOrchestrator;
use loanhub_rpc::api::{IdentityApi, LoanApi};
use loanhub_rpc::config::{ListenConfig, TransportConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TRUST_TOKEN: &str = "test-trust-token";
pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "root-password";
pub const PASSWORD: &str = "correct horse";

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        listen: ListenConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        transport: TransportConfig {
            trust_token: TRUST_TOKEN.to_string(),
            rpc_timeout: Duration::from_secs(5),
        },
        identity_url: "http://127.0.0.1:1".to_string(),
        loan_url: "http://127.0.0.1:1".to_string(),
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        cookie_domain: None,
        secure_cookies: false,
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "gateway-test-secret".to_string(),
        expiry_hours: 24,
    }
}

/// The three services wired in-process, plus a bootstrapped admin.
pub struct Services {
    pub identity: Arc<IdentityService>,
    pub ledger: Arc<LedgerService>,
    pub loans: Arc<LoanOrchestrator>,
}

pub async fn build_services() -> Services {
    let ledger = Arc::new(LedgerService::new(Arc::new(MemoryWalletStore::new())));
    let identity = Arc::new(IdentityService::new(
        Arc::new(MemoryUserStore::new()),
        ledger.clone(),
        jwt_config(),
        PasswordConfig::minimal(),
    ));
    identity
        .ensure_admin(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .expect("bootstrap admin");
    let loans = Arc::new(LoanOrchestrator::new(
        Arc::new(MemoryLoanStore::new()),
        identity.clone(),
        ledger.clone(),
    ));
    Services {
        identity,
        ledger,
        loans,
    }
}

/// Gateway router over arbitrary identity/loan implementations.
pub fn build_test_app(identity: Arc<dyn IdentityApi>, loans: Arc<dyn LoanApi>) -> Router {
    build_test_app_with_config(identity, loans, test_config())
}

pub fn build_test_app_with_config(
    identity: Arc<dyn IdentityApi>,
    loans: Arc<dyn LoanApi>,
    config: GatewayConfig,
) -> Router {
    build_app_router(AppState {
        identity,
        loans,
        config: Arc::new(config),
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The raw `set-cookie` header of a response.
pub fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` from a `set-cookie` header, ready for a `cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().trim().to_string()
}

pub async fn register(app: &Router, username: &str) -> Value {
    let response = send(
        app,
        json_request(
            Method::POST,
            "/api/register",
            json!({
                "username": username,
                "password": PASSWORD,
                "firstName": "Ada",
                "lastName": "Lovelace",
            }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Log in and return the session cookie pair.
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = send(
        app,
        json_request(
            Method::POST,
            "/api/login",
            json!({ "username": username, "password": password }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    cookie_pair(&set_cookie(&response))
}

pub async fn apply(app: &Router, cookie: &str, amount: Value) -> Response<Body> {
    send(
        app,
        json_request(
            Method::POST,
            "/api/loan/apply-loan",
            json!({ "amount": amount, "duration": 12 }),
            Some(cookie),
        ),
    )
    .await
}

pub fn approval(loan_id: &str, amount: Value) -> Value {
    json!({
        "loanId": loan_id,
        "approvedAmount": amount,
        "tenure": 12,
        "monthlyRepayment": 90,
        "effectiveDate": "2026-01-01",
        "expiryDate": "2027-01-01",
    })
}
