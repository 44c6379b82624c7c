//! Store traits: the contract each service holds against its own data.

use async_trait::async_trait;
use loanhub_core::money::Money;
use loanhub_core::types::RecordId;

use crate::error::StoreError;
use crate::models::loan::{CreateLoan, Loan, LoanApproval};
use crate::models::user::{CreateUser, User};
use crate::models::wallet::Wallet;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with [`StoreError::Duplicate`] on a taken username.
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: RecordId) -> Result<Option<User>, StoreError>;

    /// Exact, case-sensitive lookup.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Insert a zero-balance wallet. At most one wallet exists per user;
    /// a second insert fails with [`StoreError::Duplicate`].
    async fn create(&self, user_id: RecordId) -> Result<Wallet, StoreError>;

    async fn find_by_user(&self, user_id: RecordId) -> Result<Option<Wallet>, StoreError>;

    /// Atomically add `amount` to the user's balance.
    ///
    /// Returns `None` when no wallet matches. `amount` is applied as given,
    /// including zero or negative values.
    async fn credit(&self, user_id: RecordId, amount: Money) -> Result<Option<Wallet>, StoreError>;
}

#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Insert a loan in the `pending` state.
    async fn create(&self, input: &CreateLoan) -> Result<Loan, StoreError>;

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Loan>, StoreError>;

    /// Conditional `pending -> approved` update.
    ///
    /// Matches only when the loan exists **and** is still `pending`; returns
    /// `None` when zero rows matched. Two concurrent calls on the same loan
    /// can never both return `Some`.
    async fn approve(&self, id: RecordId, approval: &LoanApproval)
        -> Result<Option<Loan>, StoreError>;

    /// Conditional `pending -> rejected` update, same matching rule as
    /// [`LoanStore::approve`].
    async fn reject(&self, id: RecordId, rejected_by: RecordId)
        -> Result<Option<Loan>, StoreError>;
}
