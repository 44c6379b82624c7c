//! Loan entity model and DTOs.

use chrono::NaiveDate;
use loanhub_core::loan::LoanStatus;
use loanhub_core::money::Money;
use loanhub_core::types::{RecordId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::StoreError;

/// A loan application and, once decided, its approval or rejection details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: RecordId,
    /// Applicant and owner of the loan.
    pub user_id: RecordId,
    /// Requested amount.
    pub amount: Money,
    /// Requested duration in months.
    pub duration: i32,
    pub status: LoanStatus,
    pub approved_by: Option<RecordId>,
    pub rejected_by: Option<RecordId>,
    pub approved_amount: Option<Money>,
    pub tenure: Option<i32>,
    pub monthly_repayment: Option<Money>,
    pub effective_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    /// Zero from approval onwards; unset while pending.
    pub amount_paid: Option<Money>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for a new `pending` loan.
#[derive(Debug, Clone)]
pub struct CreateLoan {
    pub user_id: RecordId,
    pub amount: Money,
    pub duration: i32,
}

/// Fields written by the `pending -> approved` transition.
#[derive(Debug, Clone)]
pub struct LoanApproval {
    pub approved_by: RecordId,
    pub approved_amount: Money,
    pub tenure: i32,
    pub monthly_repayment: Money,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Raw `loans` row; money columns are minor units, status is text.
#[derive(Debug, FromRow)]
pub(crate) struct LoanRow {
    pub id: RecordId,
    pub user_id: RecordId,
    pub amount: i64,
    pub duration: i32,
    pub status: String,
    pub approved_by: Option<RecordId>,
    pub rejected_by: Option<RecordId>,
    pub approved_amount: Option<i64>,
    pub tenure: Option<i32>,
    pub monthly_repayment: Option<i64>,
    pub effective_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub amount_paid: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<LoanRow> for Loan {
    type Error = StoreError;

    fn try_from(row: LoanRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<LoanStatus>()
            .map_err(|e| StoreError::Corrupt(format!("loan {}: {}", row.id, e.message())))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            amount: Money::from_minor(row.amount),
            duration: row.duration,
            status,
            approved_by: row.approved_by,
            rejected_by: row.rejected_by,
            approved_amount: row.approved_amount.map(Money::from_minor),
            tenure: row.tenure,
            monthly_repayment: row.monthly_repayment.map(Money::from_minor),
            effective_date: row.effective_date,
            expiry_date: row.expiry_date,
            amount_paid: row.amount_paid.map(Money::from_minor),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
