//! In-memory store implementations.
//!
//! Used by tests and by services started without `DATABASE_URL`. Each store
//! holds a single [`RwLock`]; conditional updates check and mutate under the
//! write guard, which gives them the same all-or-nothing semantics as the
//! PostgreSQL `UPDATE ... WHERE` statements.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use loanhub_core::loan::LoanStatus;
use loanhub_core::money::Money;
use loanhub_core::types::{new_record_id, RecordId};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::loan::{CreateLoan, Loan, LoanApproval};
use crate::models::user::{CreateUser, User};
use crate::models::wallet::Wallet;
use crate::store::{LoanStore, UserStore, WalletStore};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<RecordId, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == input.username) {
            return Err(StoreError::Duplicate("uq_users_username".into()));
        }
        let user = User {
            id: new_record_id(),
            username: input.username.clone(),
            password_hash: input.password_hash.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            role: input.role.clone(),
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

// ---------------------------------------------------------------------------
// Wallets
// ---------------------------------------------------------------------------

/// Wallets keyed by owning user id.
#[derive(Default)]
pub struct MemoryWalletStore {
    wallets: RwLock<HashMap<RecordId, Wallet>>,
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.wallets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.wallets.read().await.is_empty()
    }
}

#[async_trait]
impl WalletStore for MemoryWalletStore {
    async fn create(&self, user_id: RecordId) -> Result<Wallet, StoreError> {
        let mut wallets = self.wallets.write().await;
        if wallets.contains_key(&user_id) {
            return Err(StoreError::Duplicate("uq_wallets_user_id".into()));
        }
        let now = Utc::now();
        let wallet = Wallet {
            id: new_record_id(),
            user_id,
            balance: Money::ZERO,
            created_at: now,
            updated_at: now,
        };
        wallets.insert(user_id, wallet.clone());
        Ok(wallet)
    }

    async fn find_by_user(&self, user_id: RecordId) -> Result<Option<Wallet>, StoreError> {
        Ok(self.wallets.read().await.get(&user_id).cloned())
    }

    async fn credit(&self, user_id: RecordId, amount: Money) -> Result<Option<Wallet>, StoreError> {
        let mut wallets = self.wallets.write().await;
        let Some(wallet) = wallets.get_mut(&user_id) else {
            return Ok(None);
        };
        wallet.balance = wallet
            .balance
            .checked_add(amount)
            .ok_or(StoreError::Overflow)?;
        wallet.updated_at = Utc::now();
        Ok(Some(wallet.clone()))
    }
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryLoanStore {
    loans: RwLock<HashMap<RecordId, Loan>>,
}

impl MemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a loan outright. Lets tests simulate a record vanishing
    /// between lookup and update.
    pub async fn remove(&self, id: RecordId) -> Option<Loan> {
        self.loans.write().await.remove(&id)
    }
}

#[async_trait]
impl LoanStore for MemoryLoanStore {
    async fn create(&self, input: &CreateLoan) -> Result<Loan, StoreError> {
        let now = Utc::now();
        let loan = Loan {
            id: new_record_id(),
            user_id: input.user_id,
            amount: input.amount,
            duration: input.duration,
            status: LoanStatus::Pending,
            approved_by: None,
            rejected_by: None,
            approved_amount: None,
            tenure: None,
            monthly_repayment: None,
            effective_date: None,
            expiry_date: None,
            amount_paid: None,
            created_at: now,
            updated_at: now,
        };
        self.loans.write().await.insert(loan.id, loan.clone());
        Ok(loan)
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Loan>, StoreError> {
        Ok(self.loans.read().await.get(&id).cloned())
    }

    async fn approve(
        &self,
        id: RecordId,
        approval: &LoanApproval,
    ) -> Result<Option<Loan>, StoreError> {
        let mut loans = self.loans.write().await;
        let Some(loan) = loans.get_mut(&id).filter(|l| l.status == LoanStatus::Pending) else {
            return Ok(None);
        };
        loan.status = LoanStatus::Approved;
        loan.approved_by = Some(approval.approved_by);
        loan.approved_amount = Some(approval.approved_amount);
        loan.tenure = Some(approval.tenure);
        loan.monthly_repayment = Some(approval.monthly_repayment);
        loan.effective_date = Some(approval.effective_date);
        loan.expiry_date = Some(approval.expiry_date);
        loan.amount_paid = Some(Money::ZERO);
        loan.updated_at = Utc::now();
        Ok(Some(loan.clone()))
    }

    async fn reject(
        &self,
        id: RecordId,
        rejected_by: RecordId,
    ) -> Result<Option<Loan>, StoreError> {
        let mut loans = self.loans.write().await;
        let Some(loan) = loans.get_mut(&id).filter(|l| l.status == LoanStatus::Pending) else {
            return Ok(None);
        };
        loan.status = LoanStatus::Rejected;
        loan.rejected_by = Some(rejected_by);
        loan.updated_at = Utc::now();
        Ok(Some(loan.clone()))
    }
}
