//! Wallet balances.

use std::sync::Arc;

use async_trait::async_trait;
use loanhub_core::error::CoreError;
use loanhub_core::outcome::{Outcome, Success};
use loanhub_core::types::parse_record_id;
use loanhub_db::models::wallet::Wallet;
use loanhub_db::store::WalletStore;
use loanhub_db::StoreError;
use loanhub_rpc::api::LedgerApi;
use loanhub_rpc::messages::{
    CreateWalletRequest, CreditWalletRequest, GetWalletRequest, WalletBalance,
};

const WALLET_NOT_FOUND: &str = "Wallet not found";

pub struct LedgerService {
    wallets: Arc<dyn WalletStore>,
}

impl LedgerService {
    pub fn new(wallets: Arc<dyn WalletStore>) -> Self {
        Self { wallets }
    }
}

fn balance(wallet: Wallet) -> WalletBalance {
    WalletBalance {
        user_id: wallet.user_id,
        balance: wallet.balance,
    }
}

#[async_trait]
impl LedgerApi for LedgerService {
    async fn create_wallet(&self, request: CreateWalletRequest) -> Outcome<WalletBalance> {
        let user_id = parse_record_id(&request.user_id, "user")?;

        match self.wallets.create(user_id).await {
            Ok(wallet) => {
                tracing::info!(%user_id, wallet_id = %wallet.id, "Wallet created");
                Ok(Success::created("Wallet created successfully", balance(wallet)))
            }
            Err(StoreError::Duplicate(_)) => {
                tracing::warn!(%user_id, "Wallet already exists");
                Err(CoreError::Conflict("Wallet already exists".into()))
            }
            Err(err) => {
                tracing::error!(%user_id, error = %err, "Wallet creation failed");
                Err(CoreError::Internal("Wallet creation failed".into()))
            }
        }
    }

    /// Applies `amount` as given; sanity of the amount is the caller's job.
    async fn credit_wallet(&self, request: CreditWalletRequest) -> Outcome<WalletBalance> {
        let user_id = parse_record_id(&request.user_id, "user")?;

        match self.wallets.credit(user_id, request.amount).await {
            Ok(Some(wallet)) => {
                tracing::info!(%user_id, amount = %request.amount, balance = %wallet.balance, "Wallet credited");
                Ok(Success::ok("Wallet credited successfully", balance(wallet)))
            }
            Ok(None) => {
                tracing::warn!(%user_id, "Credit for unknown wallet");
                Err(CoreError::NotFound(WALLET_NOT_FOUND.into()))
            }
            Err(StoreError::Overflow) => {
                tracing::warn!(%user_id, amount = %request.amount, "Credit would overflow balance");
                Err(CoreError::Validation("Amount out of range".into()))
            }
            Err(err) => {
                tracing::error!(%user_id, error = %err, "Failed to credit wallet");
                Err(CoreError::Internal("Failed to credit wallet".into()))
            }
        }
    }

    async fn get_wallet(&self, request: GetWalletRequest) -> Outcome<WalletBalance> {
        let user_id = parse_record_id(&request.user_id, "user")?;

        let wallet = self
            .wallets
            .find_by_user(user_id)
            .await
            .map_err(|err| {
                tracing::error!(%user_id, error = %err, "Failed to fetch wallet");
                CoreError::Internal("Failed to fetch wallet".into())
            })?
            .ok_or_else(|| CoreError::NotFound(WALLET_NOT_FOUND.into()))?;

        Ok(Success::ok("Wallet fetched successfully", balance(wallet)))
    }
}
