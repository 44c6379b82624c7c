//! Loan service: applications and the approve/reject saga.

pub mod config;
pub mod orchestrator;

pub use orchestrator::LoanOrchestrator;
