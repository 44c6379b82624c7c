//! Service contracts.
//!
//! Both the in-process service implementations and the HTTP clients in
//! [`crate::client`] implement these traits, so an orchestrator never knows
//! whether a collaborator is local or remote. Transport failures come back as
//! the same [`CoreError`](loanhub_core::error::CoreError) as application
//! failures.

use async_trait::async_trait;
use loanhub_core::outcome::Outcome;

use crate::messages::{
    ApplyLoanRequest, ApproveLoanRequest, CreateWalletRequest, CreditWalletRequest,
    GetWalletRequest, IsAdminRequest, LoanCreated, LoanDecision, LoginRequest, RegisterRequest,
    RegisteredUser, RejectLoanRequest, SessionGrant, VerifiedToken, VerifyTokenRequest,
    WalletBalance,
};

/// RPC paths, one per operation.
pub mod paths {
    pub const REGISTER: &str = "/rpc/identity/register";
    pub const LOGIN: &str = "/rpc/identity/login";
    pub const VERIFY_TOKEN: &str = "/rpc/identity/verify-token";
    pub const IS_ADMIN: &str = "/rpc/identity/is-admin";

    pub const CREATE_WALLET: &str = "/rpc/ledger/create-wallet";
    pub const CREDIT_WALLET: &str = "/rpc/ledger/credit-wallet";
    pub const GET_WALLET: &str = "/rpc/ledger/get-wallet";

    pub const APPLY_LOAN: &str = "/rpc/loan/apply-loan";
    pub const APPROVE_LOAN: &str = "/rpc/loan/approve-loan";
    pub const REJECT_LOAN: &str = "/rpc/loan/reject-loan";
}

#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Outcome<RegisteredUser>;

    async fn login(&self, request: LoginRequest) -> Outcome<SessionGrant>;

    /// Invalid tokens are an ordinary `Err(Unauthorized)` outcome, never a
    /// transport fault.
    async fn verify_token(&self, request: VerifyTokenRequest) -> Outcome<VerifiedToken>;

    async fn is_admin(&self, request: IsAdminRequest) -> Outcome<()>;
}

#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn create_wallet(&self, request: CreateWalletRequest) -> Outcome<WalletBalance>;

    async fn credit_wallet(&self, request: CreditWalletRequest) -> Outcome<WalletBalance>;

    async fn get_wallet(&self, request: GetWalletRequest) -> Outcome<WalletBalance>;
}

#[async_trait]
pub trait LoanApi: Send + Sync {
    async fn apply_loan(&self, request: ApplyLoanRequest) -> Outcome<LoanCreated>;

    async fn approve_loan(&self, request: ApproveLoanRequest) -> Outcome<LoanDecision>;

    async fn reject_loan(&self, request: RejectLoanRequest) -> Outcome<LoanDecision>;
}
