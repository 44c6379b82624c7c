//! Trust gate and client/server behaviour over the real HTTP stack.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use loanhub_core::error::CoreError;
use loanhub_core::outcome::{Outcome, Success};
use loanhub_core::types::{new_record_id, RecordId};
use loanhub_rpc::api::{paths, IdentityApi};
use loanhub_rpc::client::{HttpIdentityClient, RpcClient};
use loanhub_rpc::messages::{
    IsAdminRequest, LoginRequest, RegisterRequest, RegisteredUser, SessionGrant, VerifiedToken,
    VerifyTokenRequest,
};
use loanhub_rpc::reply::UNEXPECTED_RESPONSE;
use loanhub_rpc::server::{build_service_router, identity_routes};
use loanhub_rpc::trust::SharedSecretAuthenticator;
use tower::ServiceExt;

const SECRET: &str = "internal-secret";

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Identity stand-in that counts handler invocations.
struct FakeIdentity {
    user_id: RecordId,
    calls: AtomicUsize,
}

impl FakeIdentity {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            user_id: new_record_id(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn register(&self, _request: RegisterRequest) -> Outcome<RegisteredUser> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Success::created(
            "User registered successfully",
            RegisteredUser {
                user_id: self.user_id,
            },
        ))
    }

    async fn login(&self, _request: LoginRequest) -> Outcome<SessionGrant> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CoreError::Unauthorized("Incorrect username or password".into()))
    }

    async fn verify_token(&self, request: VerifyTokenRequest) -> Outcome<VerifiedToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.token == "good" {
            Ok(Success::ok(
                "Token is valid",
                VerifiedToken {
                    user_id: self.user_id,
                },
            ))
        } else {
            Err(CoreError::Unauthorized("Unauthorized: Invalid JWT token".into()))
        }
    }

    async fn is_admin(&self, _request: IsAdminRequest) -> Outcome<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Success::ok("Authorized", ()))
    }
}

fn app(service: Arc<FakeIdentity>) -> Router {
    build_service_router(
        "identity",
        identity_routes(service),
        Arc::new(SharedSecretAuthenticator::new(SECRET)),
    )
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str, secret: &str) -> HttpIdentityClient {
    HttpIdentityClient::new(RpcClient::new(base_url, secret, Duration::from_secs(5)).unwrap())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn rpc_request(path: &str, authorization: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::post(path).header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

// ---------------------------------------------------------------------------
// Trust gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_rejected_before_handler_runs() {
    let service = FakeIdentity::new();
    let response = app(service.clone())
        .oneshot(rpc_request(
            paths::VERIFY_TOKEN,
            None,
            serde_json::json!({ "token": "good" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "no auth token provided");
    assert_eq!(json["code"], "UNAUTHENTICATED");
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn malformed_and_wrong_tokens_have_distinct_messages() {
    let service = FakeIdentity::new();
    let body = serde_json::json!({ "token": "good" });

    let malformed = app(service.clone())
        .oneshot(rpc_request(paths::VERIFY_TOKEN, Some(SECRET), body.clone()))
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(malformed).await["error"], "invalid auth token format");

    let wrong = app(service.clone())
        .oneshot(rpc_request(paths::VERIFY_TOKEN, Some("Bearer nope"), body))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong).await["error"], "invalid auth token");

    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn trusted_call_returns_handler_reply_verbatim() {
    let service = FakeIdentity::new();
    let response = app(service.clone())
        .oneshot(rpc_request(
            paths::LOGIN,
            Some(&format!("Bearer {SECRET}")),
            serde_json::json!({ "username": "u", "password": "p" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["statusCode"], 401);
    assert_eq!(json["message"], "Incorrect username or password");
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn health_is_outside_the_trust_gate() {
    let response = app(FakeIdentity::new())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "identity");
}

// ---------------------------------------------------------------------------
// Client over TCP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_round_trips_success_and_failure_outcomes() {
    let service = FakeIdentity::new();
    let base_url = spawn(app(service.clone())).await;
    let identity = client(&base_url, SECRET);

    let verified = identity
        .verify_token(VerifyTokenRequest {
            token: "good".into(),
        })
        .await
        .unwrap();
    assert_eq!(verified.status_code, 200);
    assert_eq!(verified.payload.user_id, service.user_id);

    let registered = identity
        .register(RegisterRequest {
            username: "ada".into(),
            password: "pw".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        })
        .await
        .unwrap();
    assert_eq!(registered.status_code, 201);

    let admin = identity
        .is_admin(IsAdminRequest {
            user_id: service.user_id.to_string(),
        })
        .await;
    assert_eq!(admin, Ok(Success::ok("Authorized", ())));

    let rejected = identity
        .verify_token(VerifyTokenRequest {
            token: "bad".into(),
        })
        .await;
    assert_eq!(
        rejected,
        Err(CoreError::Unauthorized("Unauthorized: Invalid JWT token".into()))
    );
}

#[tokio::test]
async fn client_with_wrong_secret_sees_unauthorized() {
    let service = FakeIdentity::new();
    let base_url = spawn(app(service.clone())).await;

    let result = client(&base_url, "wrong")
        .verify_token(VerifyTokenRequest {
            token: "good".into(),
        })
        .await;

    assert_eq!(
        result,
        Err(CoreError::Unauthorized("invalid auth token".into()))
    );
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn unreachable_service_is_an_unexpected_response() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client(&format!("http://{addr}"), SECRET)
        .is_admin(IsAdminRequest {
            user_id: new_record_id().to_string(),
        })
        .await;

    assert_matches!(result, Err(CoreError::Internal(msg)) if msg == UNEXPECTED_RESPONSE);
}
