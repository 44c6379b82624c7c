//! Repository for the `loans` table.

use async_trait::async_trait;
use loanhub_core::loan::LoanStatus;
use loanhub_core::types::{new_record_id, RecordId};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::loan::{CreateLoan, Loan, LoanApproval, LoanRow};
use crate::store::LoanStore;

const COLUMNS: &str = "id, user_id, amount, duration, status, approved_by, rejected_by, \
                       approved_amount, tenure, monthly_repayment, effective_date, \
                       expiry_date, amount_paid, created_at, updated_at";

pub struct LoanRepo {
    pool: PgPool,
}

impl LoanRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_loan(row: Option<LoanRow>) -> Result<Option<Loan>, StoreError> {
    row.map(Loan::try_from).transpose()
}

#[async_trait]
impl LoanStore for LoanRepo {
    async fn create(&self, input: &CreateLoan) -> Result<Loan, StoreError> {
        let query = format!(
            "INSERT INTO loans (id, user_id, amount, duration, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, LoanRow>(&query)
            .bind(new_record_id())
            .bind(input.user_id)
            .bind(input.amount.minor_units())
            .bind(input.duration)
            .bind(LoanStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await?;
        Loan::try_from(row)
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Loan>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM loans WHERE id = $1");
        let row = sqlx::query_as::<_, LoanRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        into_loan(row)
    }

    async fn approve(
        &self,
        id: RecordId,
        approval: &LoanApproval,
    ) -> Result<Option<Loan>, StoreError> {
        let query = format!(
            "UPDATE loans SET
                status = $2,
                approved_by = $3,
                approved_amount = $4,
                tenure = $5,
                monthly_repayment = $6,
                effective_date = $7,
                expiry_date = $8,
                amount_paid = 0,
                updated_at = NOW()
             WHERE id = $1 AND status = $9
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, LoanRow>(&query)
            .bind(id)
            .bind(LoanStatus::Approved.as_str())
            .bind(approval.approved_by)
            .bind(approval.approved_amount.minor_units())
            .bind(approval.tenure)
            .bind(approval.monthly_repayment.minor_units())
            .bind(approval.effective_date)
            .bind(approval.expiry_date)
            .bind(LoanStatus::Pending.as_str())
            .fetch_optional(&self.pool)
            .await?;
        into_loan(row)
    }

    async fn reject(
        &self,
        id: RecordId,
        rejected_by: RecordId,
    ) -> Result<Option<Loan>, StoreError> {
        let query = format!(
            "UPDATE loans SET status = $2, rejected_by = $3, updated_at = NOW()
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, LoanRow>(&query)
            .bind(id)
            .bind(LoanStatus::Rejected.as_str())
            .bind(rejected_by)
            .bind(LoanStatus::Pending.as_str())
            .fetch_optional(&self.pool)
            .await?;
        into_loan(row)
    }
}
