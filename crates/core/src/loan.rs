//! Loan lifecycle state machine.
//!
//! ```text
//! pending ──approve──▶ approved
//!    │
//!    └────reject────▶ rejected
//! ```
//!
//! `approved` and `rejected` are terminal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
}

/// A requested lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanTransition {
    Approve,
    Reject,
}

impl LoanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, LoanStatus::Pending)
    }

    /// Resolve the status a transition leads to from `self`.
    ///
    /// Only `pending` has outgoing edges; anything else is a conflict.
    pub fn apply(self, transition: LoanTransition) -> Result<LoanStatus, CoreError> {
        match (self, transition) {
            (LoanStatus::Pending, LoanTransition::Approve) => Ok(LoanStatus::Approved),
            (LoanStatus::Pending, LoanTransition::Reject) => Ok(LoanStatus::Rejected),
            (current, _) => Err(CoreError::Conflict(format!("Loan is already {current}"))),
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LoanStatus::Pending),
            "approved" => Ok(LoanStatus::Approved),
            "rejected" => Ok(LoanStatus::Rejected),
            other => Err(CoreError::Internal(format!("Unknown loan status '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn pending_moves_to_either_terminal_state() {
        assert_eq!(
            LoanStatus::Pending.apply(LoanTransition::Approve),
            Ok(LoanStatus::Approved)
        );
        assert_eq!(
            LoanStatus::Pending.apply(LoanTransition::Reject),
            Ok(LoanStatus::Rejected)
        );
    }

    #[test]
    fn terminal_states_reject_every_transition() {
        for status in [LoanStatus::Approved, LoanStatus::Rejected] {
            assert!(status.is_terminal());
            for transition in [LoanTransition::Approve, LoanTransition::Reject] {
                assert_matches!(status.apply(transition), Err(CoreError::Conflict(_)));
            }
        }
    }

    #[test]
    fn conflict_message_names_current_state() {
        let err = LoanStatus::Approved
            .apply(LoanTransition::Reject)
            .unwrap_err();
        assert_eq!(err.message(), "Loan is already approved");
    }

    #[test]
    fn round_trips_through_str() {
        for status in [LoanStatus::Pending, LoanStatus::Approved, LoanStatus::Rejected] {
            assert_eq!(status.as_str().parse::<LoanStatus>(), Ok(status));
        }
        assert!("cancelled".parse::<LoanStatus>().is_err());
    }
}
