pub mod loan;
pub mod user;
pub mod wallet;
