//! Domain building blocks shared by every loanhub service.

pub mod config;
pub mod error;
pub mod loan;
pub mod money;
pub mod outcome;
pub mod roles;
pub mod types;
