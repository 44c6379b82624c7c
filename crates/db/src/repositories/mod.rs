//! PostgreSQL implementations of the store traits.

pub mod loan_repo;
pub mod user_repo;
pub mod wallet_repo;

pub use loan_repo::LoanRepo;
pub use user_repo::UserRepo;
pub use wallet_repo::WalletRepo;
