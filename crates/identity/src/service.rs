//! Users, session tokens, and role checks.

use std::sync::Arc;

use async_trait::async_trait;
use loanhub_core::error::CoreError;
use loanhub_core::outcome::{Outcome, Success};
use loanhub_core::roles::{ROLE_ADMIN, ROLE_USER};
use loanhub_core::types::{parse_record_id, RecordId};
use loanhub_db::models::user::{CreateUser, User};
use loanhub_db::store::UserStore;
use loanhub_db::StoreError;
use loanhub_rpc::api::{IdentityApi, LedgerApi};
use loanhub_rpc::messages::{
    CreateWalletRequest, IsAdminRequest, LoginRequest, RegisterRequest, RegisteredUser,
    SessionGrant, VerifiedToken, VerifyTokenRequest,
};

use crate::jwt::{generate_token, validate_token, JwtConfig};
use crate::password::{hash_password, verify_password, PasswordConfig};

const MISSING_FIELDS: &str = "Missing required field(s)";
const USERNAME_TAKEN: &str = "Username already exists";
const BAD_CREDENTIALS: &str = "Incorrect username or password";
const INVALID_TOKEN: &str = "Unauthorized: Invalid JWT token";
const INVALID_USER_ID: &str = "Unauthorized: Invalid user ID";
const NOT_ADMIN: &str = "Unauthorized";

pub struct IdentityService {
    users: Arc<dyn UserStore>,
    ledger: Arc<dyn LedgerApi>,
    jwt: JwtConfig,
    password: PasswordConfig,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserStore>,
        ledger: Arc<dyn LedgerApi>,
        jwt: JwtConfig,
        password: PasswordConfig,
    ) -> Self {
        Self {
            users,
            ledger,
            jwt,
            password,
        }
    }

    /// Create an admin account and its wallet unless `username` is taken.
    ///
    /// An existing account keeps whatever role it has, but its wallet is
    /// still opened if an earlier run created the user and then lost the
    /// ledger. A wallet that already exists counts as opened.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<RecordId, CoreError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(CoreError::Validation(MISSING_FIELDS.into()));
        }

        let existing = self
            .users
            .find_by_username(username)
            .await
            .map_err(store_failure("Failed to check username"))?;
        if let Some(user) = existing {
            if user.role != ROLE_ADMIN {
                tracing::warn!(user_id = %user.id, "Bootstrap admin username belongs to a non-admin");
            }
            self.ensure_wallet(user.id).await?;
            return Ok(user.id);
        }

        let user = self
            .insert_user(username, password, "Admin", "Admin", ROLE_ADMIN)
            .await?;
        self.ensure_wallet(user.id).await?;

        tracing::info!(user_id = %user.id, username, "Bootstrap admin created");
        Ok(user.id)
    }

    async fn insert_user(
        &self,
        username: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        role: &str,
    ) -> Result<User, CoreError> {
        let password_hash = self.hash(password.to_string()).await?;

        let input = CreateUser {
            username: username.to_string(),
            password_hash,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role: role.to_string(),
        };

        match self.users.create(&input).await {
            Ok(user) => Ok(user),
            Err(StoreError::Duplicate(_)) => Err(CoreError::Validation(USERNAME_TAKEN.into())),
            Err(err) => Err(store_failure("Failed to create account")(err)),
        }
    }

    /// Ask the ledger for the user's wallet. Failures come back verbatim.
    async fn open_wallet(&self, user_id: RecordId) -> Result<(), CoreError> {
        let request = CreateWalletRequest {
            user_id: user_id.to_string(),
        };
        if let Err(err) = self.ledger.create_wallet(request).await {
            tracing::warn!(
                %user_id,
                status = err.status_code(),
                error = %err,
                "Wallet creation failed, user record kept"
            );
            return Err(err);
        }
        Ok(())
    }

    async fn ensure_wallet(&self, user_id: RecordId) -> Result<(), CoreError> {
        match self.open_wallet(user_id).await {
            Err(CoreError::Conflict(_)) => Ok(()),
            other => other,
        }
    }

    async fn hash(&self, password: String) -> Result<String, CoreError> {
        let config = self.password;
        tokio::task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "Password hashing task failed");
                CoreError::Internal("Failed to create account".into())
            })?
            .map_err(|err| {
                tracing::error!(error = %err, "Password hashing failed");
                CoreError::Internal("Failed to create account".into())
            })
    }

    async fn password_matches(&self, password: String, hash: String) -> Result<bool, CoreError> {
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "Password verification task failed");
                CoreError::Internal("Failed to verify password".into())
            })?
            .map_err(|err| {
                tracing::error!(error = %err, "Stored password hash is unreadable");
                CoreError::Internal("Failed to verify password".into())
            })
    }
}

/// Log a store failure and replace it with a fixed caller-facing message.
fn store_failure(message: &'static str) -> impl FnOnce(StoreError) -> CoreError {
    move |err| {
        tracing::error!(error = %err, "{message}");
        CoreError::Internal(message.into())
    }
}

#[async_trait]
impl IdentityApi for IdentityService {
    async fn register(&self, request: RegisterRequest) -> Outcome<RegisteredUser> {
        let username = request.username.trim();
        if username.is_empty()
            || request.password.is_empty()
            || request.first_name.trim().is_empty()
            || request.last_name.trim().is_empty()
        {
            return Err(CoreError::Validation(MISSING_FIELDS.into()));
        }

        let existing = self
            .users
            .find_by_username(username)
            .await
            .map_err(store_failure("Failed to check username"))?;
        if existing.is_some() {
            return Err(CoreError::Validation(USERNAME_TAKEN.into()));
        }

        let user = self
            .insert_user(
                username,
                &request.password,
                request.first_name.trim(),
                request.last_name.trim(),
                ROLE_USER,
            )
            .await?;
        tracing::info!(user_id = %user.id, "User registered");

        self.open_wallet(user.id).await?;

        Ok(Success::created(
            "User registered successfully!",
            RegisteredUser { user_id: user.id },
        ))
    }

    async fn login(&self, request: LoginRequest) -> Outcome<SessionGrant> {
        let user = self
            .users
            .find_by_username(&request.username)
            .await
            .map_err(store_failure("Database error"))?
            .ok_or_else(|| CoreError::Unauthorized(BAD_CREDENTIALS.into()))?;

        if !self
            .password_matches(request.password, user.password_hash)
            .await?
        {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(CoreError::Unauthorized(BAD_CREDENTIALS.into()));
        }

        let token = generate_token(user.id, &self.jwt).map_err(|err| {
            tracing::error!(error = %err, "Token generation failed");
            CoreError::Internal("Failed to generate token".into())
        })?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(Success::ok(
            "Logged in successfully",
            SessionGrant {
                token,
                expires_in: self.jwt.expiry_secs(),
            },
        ))
    }

    async fn verify_token(&self, request: VerifyTokenRequest) -> Outcome<VerifiedToken> {
        let claims = validate_token(&request.token, &self.jwt)
            .map_err(|_| CoreError::Unauthorized(INVALID_TOKEN.into()))?;

        Ok(Success::ok(
            "token valid",
            VerifiedToken {
                user_id: claims.sub,
            },
        ))
    }

    async fn is_admin(&self, request: IsAdminRequest) -> Outcome<()> {
        let user_id = parse_record_id(&request.user_id, "user")
            .map_err(|_| CoreError::Unauthorized(INVALID_USER_ID.into()))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(store_failure("Database error"))?;

        // Unknown ids and non-admins get the same answer.
        match user {
            Some(user) if user.role == ROLE_ADMIN => Ok(Success::ok("Successful", ())),
            _ => Err(CoreError::Unauthorized(NOT_ADMIN.into())),
        }
    }
}
