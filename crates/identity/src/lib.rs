//! Identity service: user accounts, session tokens, and admin checks.

pub mod config;
pub mod jwt;
pub mod password;
pub mod service;

pub use service::IdentityService;
