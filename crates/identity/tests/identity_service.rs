//! IdentityService against the in-memory user store and a scripted ledger.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use loanhub_core::error::CoreError;
use loanhub_core::money::Money;
use loanhub_core::outcome::{Outcome, Success};
use loanhub_core::types::{new_record_id, parse_record_id};
use loanhub_db::memory::MemoryUserStore;
use loanhub_db::store::UserStore;
use loanhub_identity::jwt::JwtConfig;
use loanhub_identity::password::PasswordConfig;
use loanhub_identity::IdentityService;
use loanhub_rpc::api::{IdentityApi, LedgerApi};
use loanhub_rpc::messages::{
    CreateWalletRequest, CreditWalletRequest, GetWalletRequest, IsAdminRequest, LoginRequest,
    RegisterRequest, VerifyTokenRequest, WalletBalance,
};
use tokio::sync::Mutex;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Ledger stand-in that records wallet creations and can be told to fail.
/// Rejects a second wallet for the same user, like the real ledger.
#[derive(Default)]
struct RecordingLedger {
    created: Mutex<Vec<String>>,
    failure: Mutex<Option<CoreError>>,
}

impl RecordingLedger {
    fn failing(err: CoreError) -> Self {
        Self {
            failure: Mutex::new(Some(err)),
            ..Self::default()
        }
    }

    async fn recover(&self) {
        self.failure.lock().await.take();
    }

    async fn created(&self) -> Vec<String> {
        self.created.lock().await.clone()
    }
}

#[async_trait]
impl LedgerApi for RecordingLedger {
    async fn create_wallet(&self, request: CreateWalletRequest) -> Outcome<WalletBalance> {
        if let Some(err) = self.failure.lock().await.clone() {
            return Err(err);
        }
        let user_id = parse_record_id(&request.user_id, "user")?;
        let mut created = self.created.lock().await;
        if created.contains(&request.user_id) {
            return Err(CoreError::Conflict("Wallet already exists".into()));
        }
        created.push(request.user_id);
        Ok(Success::created(
            "Wallet created successfully",
            WalletBalance {
                user_id,
                balance: Money::ZERO,
            },
        ))
    }

    async fn credit_wallet(&self, _request: CreditWalletRequest) -> Outcome<WalletBalance> {
        unreachable!("identity never credits wallets")
    }

    async fn get_wallet(&self, _request: GetWalletRequest) -> Outcome<WalletBalance> {
        unreachable!("identity never reads wallets")
    }
}

struct Harness {
    service: IdentityService,
    users: Arc<MemoryUserStore>,
    ledger: Arc<RecordingLedger>,
}

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "identity-test-secret".into(),
        expiry_hours: 24,
    }
}

fn harness_with(ledger: RecordingLedger) -> Harness {
    let users = Arc::new(MemoryUserStore::new());
    let ledger = Arc::new(ledger);
    let service = IdentityService::new(
        users.clone(),
        ledger.clone(),
        jwt_config(),
        PasswordConfig::minimal(),
    );
    Harness {
        service,
        users,
        ledger,
    }
}

fn harness() -> Harness {
    harness_with(RecordingLedger::default())
}

fn registration(username: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.into(),
        password: "hunter22".into(),
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
    }
}

fn login(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.into(),
        password: password.into(),
    }
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_creates_user_and_wallet() {
    let h = harness();

    let success = h.service.register(registration("grace")).await.unwrap();

    assert_eq!(success.status_code, 201);
    assert_eq!(h.ledger.created().await, vec![success.payload.user_id.to_string()]);

    let stored = h.users.find_by_username("grace").await.unwrap().unwrap();
    assert_eq!(stored.id, success.payload.user_id);
    assert_eq!(stored.role, "user");
    assert_ne!(stored.password_hash, "hunter22");
}

#[tokio::test]
async fn register_trims_username() {
    let h = harness();
    h.service.register(registration("  grace ")).await.unwrap();

    assert!(h.users.find_by_username("grace").await.unwrap().is_some());
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let h = harness();
    let mut request = registration("grace");
    request.last_name = "   ".into();

    assert_eq!(
        h.service.register(request).await,
        Err(CoreError::Validation("Missing required field(s)".into()))
    );
    assert!(h.users.is_empty().await);
}

#[tokio::test]
async fn duplicate_username_fails_without_new_records() {
    let h = harness();
    h.service.register(registration("grace")).await.unwrap();

    let second = h.service.register(registration(" grace")).await;

    assert_eq!(
        second,
        Err(CoreError::Validation("Username already exists".into()))
    );
    assert_eq!(h.users.len().await, 1);
    assert_eq!(h.ledger.created().await.len(), 1);
}

#[tokio::test]
async fn usernames_are_case_sensitive() {
    let h = harness();
    h.service.register(registration("grace")).await.unwrap();
    h.service.register(registration("Grace")).await.unwrap();

    assert_eq!(h.users.len().await, 2);
}

#[tokio::test]
async fn wallet_failure_fails_register_but_keeps_user() {
    let h = harness_with(RecordingLedger::failing(CoreError::Conflict(
        "Wallet already exists".into(),
    )));

    let result = h.service.register(registration("grace")).await;

    assert_eq!(result, Err(CoreError::Conflict("Wallet already exists".into())));
    assert_eq!(h.users.len().await, 1);
}

// ---------------------------------------------------------------------------
// Login / VerifyToken
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_issues_token_that_verifies_to_the_user() {
    let h = harness();
    let user_id = h.service.register(registration("grace")).await.unwrap().payload.user_id;

    let grant = h.service.login(login("grace", "hunter22")).await.unwrap();
    assert_eq!(grant.payload.expires_in, 24 * 3600);

    let verified = h
        .service
        .verify_token(VerifyTokenRequest {
            token: grant.payload.token,
        })
        .await
        .unwrap();
    assert_eq!(verified.payload.user_id, user_id);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_fail_identically() {
    let h = harness();
    h.service.register(registration("grace")).await.unwrap();

    let wrong_password = h.service.login(login("grace", "nope")).await;
    let unknown_user = h.service.login(login("ada", "hunter22")).await;

    let expected = Err(CoreError::Unauthorized("Incorrect username or password".into()));
    assert_eq!(wrong_password, expected);
    assert_eq!(unknown_user, expected);
}

#[tokio::test]
async fn invalid_token_is_an_ordinary_unauthorized_outcome() {
    let h = harness();

    let result = h
        .service
        .verify_token(VerifyTokenRequest {
            token: "garbage".into(),
        })
        .await;

    assert_eq!(
        result,
        Err(CoreError::Unauthorized("Unauthorized: Invalid JWT token".into()))
    );
}

#[tokio::test]
async fn token_signed_elsewhere_is_rejected() {
    let h = harness();
    let foreign = JwtConfig {
        secret: "someone-else".into(),
        expiry_hours: 24,
    };
    let token = loanhub_identity::jwt::generate_token(new_record_id(), &foreign).unwrap();

    assert_matches!(
        h.service.verify_token(VerifyTokenRequest { token }).await,
        Err(CoreError::Unauthorized(_))
    );
}

// ---------------------------------------------------------------------------
// IsAdmin / bootstrap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn is_admin_hides_whether_the_user_exists() {
    let h = harness();
    let user_id = h.service.register(registration("grace")).await.unwrap().payload.user_id;

    let regular = h
        .service
        .is_admin(IsAdminRequest {
            user_id: user_id.to_string(),
        })
        .await;
    let unknown = h
        .service
        .is_admin(IsAdminRequest {
            user_id: new_record_id().to_string(),
        })
        .await;

    assert_eq!(regular, Err(CoreError::Unauthorized("Unauthorized".into())));
    assert_eq!(unknown, regular);
}

#[tokio::test]
async fn is_admin_rejects_malformed_id() {
    let h = harness();

    assert_eq!(
        h.service
            .is_admin(IsAdminRequest {
                user_id: "12345".into(),
            })
            .await,
        Err(CoreError::Unauthorized("Unauthorized: Invalid user ID".into()))
    );
}

#[tokio::test]
async fn bootstrapped_admin_passes_is_admin_and_can_log_in() {
    let h = harness();

    let admin_id = h.service.ensure_admin("root", "rootpw").await.unwrap();
    // Second call finds the user and its wallet already in place.
    assert_eq!(h.service.ensure_admin("root", "other").await, Ok(admin_id));

    assert_eq!(
        h.service
            .is_admin(IsAdminRequest {
                user_id: admin_id.to_string(),
            })
            .await,
        Ok(Success::ok("Successful", ()))
    );
    assert!(h.service.login(login("root", "rootpw")).await.is_ok());
    assert_eq!(h.users.len().await, 1);
    assert_eq!(h.ledger.created().await, vec![admin_id.to_string()]);
}

#[tokio::test]
async fn admin_bootstrap_opens_wallet_missed_by_earlier_run() {
    let h = harness_with(RecordingLedger::failing(CoreError::Internal(
        "Ledger unreachable".into(),
    )));

    assert_matches!(
        h.service.ensure_admin("root", "rootpw").await,
        Err(CoreError::Internal(_))
    );
    assert_eq!(h.users.len().await, 1);
    assert!(h.ledger.created().await.is_empty());

    h.ledger.recover().await;
    let admin_id = h.service.ensure_admin("root", "rootpw").await.unwrap();

    assert_eq!(h.users.len().await, 1);
    assert_eq!(h.ledger.created().await, vec![admin_id.to_string()]);
}
