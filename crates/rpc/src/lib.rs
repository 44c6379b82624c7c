//! Transport layer for the loanhub services: JSON-over-HTTP RPC with a
//! shared-secret trust gate.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod messages;
pub mod reply;
pub mod server;
pub mod telemetry;
pub mod trust;
