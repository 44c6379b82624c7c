//! User-facing HTTP gateway.
//!
//! Terminates browser requests, keeps the session in the `jwt` cookie and
//! forwards every operation to the identity and loan services. Outcomes are
//! relayed with their status code and message unchanged.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
