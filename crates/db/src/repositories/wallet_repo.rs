//! Repository for the `wallets` table.

use async_trait::async_trait;
use loanhub_core::money::Money;
use loanhub_core::types::{new_record_id, RecordId};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::wallet::{Wallet, WalletRow};
use crate::store::WalletStore;

const COLUMNS: &str = "id, user_id, balance, created_at, updated_at";

pub struct WalletRepo {
    pool: PgPool,
}

impl WalletRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WalletStore for WalletRepo {
    async fn create(&self, user_id: RecordId) -> Result<Wallet, StoreError> {
        let query = format!(
            "INSERT INTO wallets (id, user_id, balance)
             VALUES ($1, $2, 0)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, WalletRow>(&query)
            .bind(new_record_id())
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn find_by_user(&self, user_id: RecordId) -> Result<Option<Wallet>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM wallets WHERE user_id = $1");
        let row = sqlx::query_as::<_, WalletRow>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Wallet::from))
    }

    async fn credit(&self, user_id: RecordId, amount: Money) -> Result<Option<Wallet>, StoreError> {
        // Single-statement increment; concurrent credits serialize on the row lock.
        let query = format!(
            "UPDATE wallets SET balance = balance + $2, updated_at = NOW()
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, WalletRow>(&query)
            .bind(user_id)
            .bind(amount.minor_units())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Wallet::from))
    }
}
