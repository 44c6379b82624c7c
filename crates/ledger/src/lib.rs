//! Ledger service: one wallet per user, credit-only.

pub mod config;
pub mod service;

pub use service::LedgerService;
