//! Wallet entity model.

use loanhub_core::money::Money;
use loanhub_core::types::{RecordId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One wallet per user. The balance only ever moves through
/// [`crate::store::WalletStore::credit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: RecordId,
    pub user_id: RecordId,
    pub balance: Money,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Raw `wallets` row; `balance` is stored in minor units.
#[derive(Debug, FromRow)]
pub(crate) struct WalletRow {
    pub id: RecordId,
    pub user_id: RecordId,
    pub balance: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<WalletRow> for Wallet {
    fn from(row: WalletRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            balance: Money::from_minor(row.balance),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
