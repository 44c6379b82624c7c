//! HTTP clients for the internal services.

use std::time::Duration;

use async_trait::async_trait;
use loanhub_core::outcome::Outcome;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{paths, IdentityApi, LedgerApi, LoanApi};
use crate::error::RpcError;
use crate::messages::{
    ApplyLoanRequest, ApproveLoanRequest, CreateWalletRequest, CreditWalletRequest,
    GetWalletRequest, IsAdminRequest, LoanCreated, LoanDecision, LoginRequest, RegisterRequest,
    RegisteredUser, RejectLoanRequest, SessionGrant, VerifiedToken, VerifyTokenRequest,
    WalletBalance,
};
use crate::reply::Reply;

/// A trust-authenticated JSON client bound to one service base URL.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
    authorization: HeaderValue,
}

impl RpcClient {
    pub fn new(
        base_url: impl Into<String>,
        trust_token: &str,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {trust_token}"))
            .map_err(|_| RpcError::InvalidCredential)?;
        authorization.set_sensitive(true);

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            authorization,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `request` to `path` and decode the reply envelope.
    pub async fn call<Req, T>(&self, path: &str, request: &Req) -> Result<Reply<T>, RpcError>
    where
        Req: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header(AUTHORIZATION, self.authorization.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Status {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        Ok(response.json::<Reply<T>>().await?)
    }

    /// Like [`call`](Self::call), with transport faults folded into the
    /// outcome's error side.
    pub async fn invoke<Req, T>(&self, path: &str, request: &Req) -> Outcome<T>
    where
        Req: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match self.call(path, request).await {
            Ok(reply) => reply.into_outcome(),
            Err(err) => {
                tracing::warn!(base_url = %self.base_url, path, error = %err, "RPC call failed");
                Err(err.into())
            }
        }
    }
}

/// Pull the `error` field out of a JSON error body, else use the raw text.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("Unknown error").to_string()
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Typed clients
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct HttpIdentityClient {
    rpc: RpcClient,
}

impl HttpIdentityClient {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl IdentityApi for HttpIdentityClient {
    async fn register(&self, request: RegisterRequest) -> Outcome<RegisteredUser> {
        self.rpc.invoke(paths::REGISTER, &request).await
    }

    async fn login(&self, request: LoginRequest) -> Outcome<SessionGrant> {
        self.rpc.invoke(paths::LOGIN, &request).await
    }

    async fn verify_token(&self, request: VerifyTokenRequest) -> Outcome<VerifiedToken> {
        self.rpc.invoke(paths::VERIFY_TOKEN, &request).await
    }

    async fn is_admin(&self, request: IsAdminRequest) -> Outcome<()> {
        self.rpc.invoke(paths::IS_ADMIN, &request).await
    }
}

#[derive(Clone)]
pub struct HttpLedgerClient {
    rpc: RpcClient,
}

impl HttpLedgerClient {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl LedgerApi for HttpLedgerClient {
    async fn create_wallet(&self, request: CreateWalletRequest) -> Outcome<WalletBalance> {
        self.rpc.invoke(paths::CREATE_WALLET, &request).await
    }

    async fn credit_wallet(&self, request: CreditWalletRequest) -> Outcome<WalletBalance> {
        self.rpc.invoke(paths::CREDIT_WALLET, &request).await
    }

    async fn get_wallet(&self, request: GetWalletRequest) -> Outcome<WalletBalance> {
        self.rpc.invoke(paths::GET_WALLET, &request).await
    }
}

#[derive(Clone)]
pub struct HttpLoanClient {
    rpc: RpcClient,
}

impl HttpLoanClient {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl LoanApi for HttpLoanClient {
    async fn apply_loan(&self, request: ApplyLoanRequest) -> Outcome<LoanCreated> {
        self.rpc.invoke(paths::APPLY_LOAN, &request).await
    }

    async fn approve_loan(&self, request: ApproveLoanRequest) -> Outcome<LoanDecision> {
        self.rpc.invoke(paths::APPROVE_LOAN, &request).await
    }

    async fn reject_loan(&self, request: RejectLoanRequest) -> Outcome<LoanDecision> {
        self.rpc.invoke(paths::REJECT_LOAN, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_error_field() {
        assert_eq!(
            error_message(r#"{"error":"invalid auth token","code":"UNAUTHENTICATED"}"#, None),
            "invalid auth token"
        );
        assert_eq!(error_message("  upstream down ", None), "upstream down");
        assert_eq!(error_message("", Some("Bad Gateway")), "Bad Gateway");
    }

    #[test]
    fn rejects_secret_that_cannot_be_a_header() {
        let result = RpcClient::new("http://localhost:1", "bad\nsecret", Duration::from_secs(1));
        assert!(matches!(result, Err(RpcError::InvalidCredential)));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client =
            RpcClient::new("http://localhost:50051/", "s", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:50051");
    }
}
