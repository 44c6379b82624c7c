//! Loan lifecycle and the approval saga.
//!
//! Approval runs four steps in order, each gating the next:
//!
//! 1. `IsAdmin` on the acting user (identity service).
//! 2. Load the loan; it must exist and be `pending`.
//! 3. Conditional `pending -> approved` update in the loan store.
//! 4. `CreditWallet` for the applicant (ledger service).
//!
//! Steps 3 and 4 are not atomic. When the credit fails the loan stays
//! `approved` and the ledger's failure is returned to the caller, so
//! "approved" does not imply "funds disbursed".
//!
//! Step 3 is the only concurrency guard: of two racing approvals exactly one
//! matches `status = 'pending'`, and only that one reaches step 4.

use std::sync::Arc;

use async_trait::async_trait;
use loanhub_core::error::CoreError;
use loanhub_core::loan::{LoanStatus, LoanTransition};
use loanhub_core::outcome::{Outcome, Success};
use loanhub_core::types::{parse_record_id, RecordId};
use loanhub_db::models::loan::{CreateLoan, LoanApproval};
use loanhub_db::store::LoanStore;
use loanhub_db::StoreError;
use loanhub_rpc::api::{IdentityApi, LedgerApi, LoanApi};
use loanhub_rpc::messages::{
    ApplyLoanRequest, ApproveLoanRequest, CreditWalletRequest, IsAdminRequest, LoanCreated,
    LoanDecision, RejectLoanRequest,
};

const LOAN_NOT_FOUND: &str = "Loan not found";

pub struct LoanOrchestrator {
    loans: Arc<dyn LoanStore>,
    identity: Arc<dyn IdentityApi>,
    ledger: Arc<dyn LedgerApi>,
}

impl LoanOrchestrator {
    pub fn new(
        loans: Arc<dyn LoanStore>,
        identity: Arc<dyn IdentityApi>,
        ledger: Arc<dyn LedgerApi>,
    ) -> Self {
        Self {
            loans,
            identity,
            ledger,
        }
    }

    /// Gate on `IsAdmin`, surfacing its failure verbatim, and return the
    /// acting admin's id.
    async fn authorize_admin(&self, user_id: &str) -> Result<RecordId, CoreError> {
        let request = IsAdminRequest {
            user_id: user_id.to_string(),
        };
        if let Err(err) = self.identity.is_admin(request).await {
            tracing::warn!(acting_user = user_id, status = err.status_code(), "Admin check failed");
            return Err(err);
        }
        parse_record_id(user_id, "user")
    }

    /// Work out why a conditional update matched nothing: the loan is
    /// either gone or has already left `pending`.
    async fn explain_miss(
        &self,
        loan_id: RecordId,
        transition: LoanTransition,
        failure: &'static str,
    ) -> CoreError {
        match self.loans.find_by_id(loan_id).await {
            Ok(Some(loan)) => match loan.status.apply(transition) {
                Err(conflict) => conflict,
                Ok(_) => CoreError::Conflict("Loan was modified concurrently".into()),
            },
            Ok(None) => CoreError::NotFound(LOAN_NOT_FOUND.into()),
            Err(err) => store_failure(failure)(err),
        }
    }
}

/// Log a store failure and replace it with a fixed caller-facing message.
fn store_failure(message: &'static str) -> impl FnOnce(StoreError) -> CoreError {
    move |err| {
        tracing::error!(error = %err, "{message}");
        CoreError::Internal(message.into())
    }
}

#[async_trait]
impl LoanApi for LoanOrchestrator {
    async fn apply_loan(&self, request: ApplyLoanRequest) -> Outcome<LoanCreated> {
        let user_id = parse_record_id(&request.user_id, "user")?;

        let input = CreateLoan {
            user_id,
            amount: request.amount,
            duration: request.duration,
        };
        let loan = self
            .loans
            .create(&input)
            .await
            .map_err(store_failure("Loan application failed"))?;

        tracing::info!(loan_id = %loan.id, %user_id, amount = %loan.amount, "Loan application submitted");
        Ok(Success::created(
            "Loan application submitted",
            LoanCreated { loan_id: loan.id },
        ))
    }

    async fn approve_loan(&self, request: ApproveLoanRequest) -> Outcome<LoanDecision> {
        const FAILURE: &str = "Failed to approve loan";

        // 1. Authorization.
        let admin_id = self.authorize_admin(&request.user_id).await?;

        if !request.approved_amount.is_positive() {
            return Err(CoreError::Validation("Approved amount must be positive".into()));
        }
        if request.tenure <= 0 {
            return Err(CoreError::Validation("Tenure must be positive".into()));
        }
        let loan_id = parse_record_id(&request.loan_id, "loan")?;

        // 2. Lookup.
        let loan = self
            .loans
            .find_by_id(loan_id)
            .await
            .map_err(store_failure(FAILURE))?
            .ok_or_else(|| CoreError::NotFound(LOAN_NOT_FOUND.into()))?;
        loan.status.apply(LoanTransition::Approve).inspect_err(|_| {
            tracing::warn!(%loan_id, status = %loan.status, "Approval of a decided loan refused");
        })?;

        // 3. Conditional update.
        let approval = LoanApproval {
            approved_by: admin_id,
            approved_amount: request.approved_amount,
            tenure: request.tenure,
            monthly_repayment: request.monthly_repayment,
            effective_date: request.effective_date,
            expiry_date: request.expiry_date,
        };
        let Some(approved) = self
            .loans
            .approve(loan_id, &approval)
            .await
            .map_err(store_failure(FAILURE))?
        else {
            tracing::warn!(%loan_id, "Approval lost the race for a pending loan");
            return Err(self
                .explain_miss(loan_id, LoanTransition::Approve, FAILURE)
                .await);
        };
        tracing::info!(%loan_id, %admin_id, amount = %request.approved_amount, "Loan approved");

        // 4. Disbursement. No rollback of step 3 on failure.
        let credit = CreditWalletRequest {
            user_id: approved.user_id.to_string(),
            amount: request.approved_amount,
        };
        if let Err(err) = self.ledger.credit_wallet(credit).await {
            tracing::error!(
                %loan_id,
                user_id = %approved.user_id,
                status = err.status_code(),
                error = %err,
                "Loan approved but disbursement failed"
            );
            return Err(err);
        }
        tracing::info!(%loan_id, user_id = %approved.user_id, "Loan disbursed");

        Ok(Success::ok(
            "Loan approved successfully",
            LoanDecision {
                loan_id,
                status: LoanStatus::Approved,
            },
        ))
    }

    async fn reject_loan(&self, request: RejectLoanRequest) -> Outcome<LoanDecision> {
        const FAILURE: &str = "Failed to reject loan";

        let admin_id = self.authorize_admin(&request.user_id).await?;
        let loan_id = parse_record_id(&request.loan_id, "loan")?;

        let rejected = self
            .loans
            .reject(loan_id, admin_id)
            .await
            .map_err(store_failure(FAILURE))?;
        if rejected.is_none() {
            return Err(self
                .explain_miss(loan_id, LoanTransition::Reject, FAILURE)
                .await);
        }

        tracing::info!(%loan_id, %admin_id, "Loan rejected");
        Ok(Success::ok(
            "Loan rejected successfully",
            LoanDecision {
                loan_id,
                status: LoanStatus::Rejected,
            },
        ))
    }
}
