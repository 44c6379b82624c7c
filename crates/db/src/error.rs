/// Range check on `wallets.balance`, mirroring `Money::MAX_MAJOR`.
pub const BALANCE_RANGE_CONSTRAINT: &str = "ck_wallets_balance_range";

/// Errors raised by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Duplicate value violates unique constraint: {0}")]
    Duplicate(String),

    /// An arithmetic update would leave the representable range.
    #[error("Numeric value out of range")]
    Overflow,

    /// A persisted row could not be mapped back into a model.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    /// Classify PostgreSQL error codes that callers branch on.
    ///
    /// - `23505` (unique violation) becomes [`StoreError::Duplicate`].
    /// - `22003` (numeric out of range) becomes [`StoreError::Overflow`].
    /// - `23514` on [`BALANCE_RANGE_CONSTRAINT`] also becomes
    ///   [`StoreError::Overflow`].
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                    return StoreError::Duplicate(constraint);
                }
                Some("22003") => return StoreError::Overflow,
                Some("23514") if db_err.constraint() == Some(BALANCE_RANGE_CONSTRAINT) => {
                    return StoreError::Overflow;
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}
