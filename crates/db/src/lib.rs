//! Persistence for the loanhub services.
//!
//! Each service owns one store family: identity owns users, ledger owns
//! wallets, loan owns loans. Every store has a PostgreSQL implementation in
//! [`repositories`] and an in-memory one in [`memory`], both behind the
//! traits in [`store`].

pub mod error;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;

pub use error::StoreError;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply one service's migration set.
///
/// Versions are unique across the three sets, so services may share one
/// database and its `_sqlx_migrations` table. Rows applied by the other
/// services are ignored rather than reported as missing.
async fn apply(mut migrator: Migrator, pool: &DbPool) -> Result<(), MigrateError> {
    migrator.set_ignore_missing(true);
    migrator.run(pool).await
}

/// Apply the `users` schema owned by the identity service.
pub async fn run_identity_migrations(pool: &DbPool) -> Result<(), MigrateError> {
    apply(sqlx::migrate!("./migrations/identity"), pool).await
}

/// Apply the `wallets` schema owned by the ledger service.
pub async fn run_ledger_migrations(pool: &DbPool) -> Result<(), MigrateError> {
    apply(sqlx::migrate!("./migrations/ledger"), pool).await
}

/// Apply the `loans` schema owned by the loan service.
pub async fn run_loan_migrations(pool: &DbPool) -> Result<(), MigrateError> {
    apply(sqlx::migrate!("./migrations/loan"), pool).await
}
