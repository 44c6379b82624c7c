//! Handlers for the `/loan` resource.
//!
//! The caller's identity always comes from the session, never from the body.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use loanhub_core::money::Money;
use loanhub_rpc::messages::{
    ApplyLoanRequest, ApproveLoanRequest, LoanCreated, LoanDecision, RejectLoanRequest,
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::{relay, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/loan/apply-loan`.
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyLoanBody {
    #[validate(custom(function = "positive_amount"))]
    pub amount: Money,
    /// Months.
    #[validate(range(min = 1, message = "Duration must be at least 1 month"))]
    pub duration: i32,
}

/// Request body for `PUT /api/loan/approve-loan`.
///
/// Only the shape is checked here. The loan service validates the values
/// after its admin check, so non-admins always see 401.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApproveLoanBody {
    pub loan_id: String,
    pub approved_amount: Money,
    pub tenure: i32,
    pub monthly_repayment: Money,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Request body for `PUT /api/loan/reject-loan`. Shape only, like
/// [`ApproveLoanBody`].
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RejectLoanBody {
    pub loan_id: String,
}

fn positive_amount(amount: &Money) -> Result<(), ValidationError> {
    if amount.is_positive() {
        return Ok(());
    }
    let mut err = ValidationError::new("positive");
    err.message = Some("Amount must be positive".into());
    Err(err)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/loan/apply-loan
pub async fn apply_loan(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(body): ValidatedJson<ApplyLoanBody>,
) -> AppResult<(StatusCode, Json<MessageResponse<LoanCreated>>)> {
    let success = state
        .loans
        .apply_loan(ApplyLoanRequest {
            user_id: user.user_id.to_string(),
            amount: body.amount,
            duration: body.duration,
        })
        .await?;

    Ok(relay(success))
}

/// PUT /api/loan/approve-loan (admin only, enforced by the loan service)
pub async fn approve_loan(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(body): ValidatedJson<ApproveLoanBody>,
) -> AppResult<(StatusCode, Json<MessageResponse<LoanDecision>>)> {
    let success = state
        .loans
        .approve_loan(ApproveLoanRequest {
            user_id: user.user_id.to_string(),
            loan_id: body.loan_id,
            approved_amount: body.approved_amount,
            tenure: body.tenure,
            monthly_repayment: body.monthly_repayment,
            effective_date: body.effective_date,
            expiry_date: body.expiry_date,
        })
        .await?;

    Ok(relay(success))
}

/// PUT /api/loan/reject-loan (admin only, enforced by the loan service)
pub async fn reject_loan(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(body): ValidatedJson<RejectLoanBody>,
) -> AppResult<(StatusCode, Json<MessageResponse<LoanDecision>>)> {
    let success = state
        .loans
        .reject_loan(RejectLoanRequest {
            user_id: user.user_id.to_string(),
            loan_id: body.loan_id,
        })
        .await?;

    Ok(relay(success))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_body_rejects_zero_amount_and_duration() {
        let body: ApplyLoanBody =
            serde_json::from_str(r#"{"amount": 0, "duration": 0}"#).unwrap();
        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("amount"));
        assert!(fields.contains_key("duration"));
    }

    #[test]
    fn approve_body_accepts_decimal_strings() {
        let body: ApproveLoanBody = serde_json::from_str(
            r#"{
                "loanId": "0191e2a4-0000-7000-8000-000000000000",
                "approvedAmount": "1000.50",
                "tenure": 12,
                "monthlyRepayment": 90,
                "effectiveDate": "2026-01-01",
                "expiryDate": "2027-01-01"
            }"#,
        )
        .unwrap();
        assert!(body.validate().is_ok());
        assert_eq!(body.approved_amount.to_string(), "1000.50");
    }

    #[test]
    fn decision_bodies_defer_value_checks() {
        let reject: RejectLoanBody = serde_json::from_str(r#"{"loanId": ""}"#).unwrap();
        assert!(reject.validate().is_ok());

        let approve: ApproveLoanBody = serde_json::from_str(
            r#"{
                "loanId": "",
                "approvedAmount": 0,
                "tenure": 0,
                "monthlyRepayment": 0,
                "effectiveDate": "2026-01-01",
                "expiryDate": "2027-01-01"
            }"#,
        )
        .unwrap();
        assert!(approve.validate().is_ok());
    }
}
