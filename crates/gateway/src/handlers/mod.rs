pub mod auth;
pub mod loan;
