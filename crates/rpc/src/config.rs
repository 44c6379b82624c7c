//! Settings shared by every binary that speaks RPC.

use std::time::Duration;

use loanhub_core::config::{self, ConfigError};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Load `.env` unless running in production mode.
pub fn load_dotenv() {
    if !config::is_production() {
        dotenvy::dotenv().ok();
    }
}

/// Where a binary listens.
#[derive(Debug, Clone)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

impl ListenConfig {
    /// Read `HOST` and `PORT`, with `default_port` when `PORT` is unset.
    pub fn from_env(default_port: u16) -> Result<Self, ConfigError> {
        Ok(Self {
            host: config::or_default("HOST", DEFAULT_HOST),
            port: config::parse_or("PORT", default_port)?,
        })
    }
}

/// Trust credential and per-call timeout for outbound and inbound RPC.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub trust_token: String,
    pub rpc_timeout: Duration,
}

impl TransportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            trust_token: config::required("TRUST_TOKEN")?,
            rpc_timeout: Duration::from_secs(config::parse_or(
                "RPC_TIMEOUT_SECS",
                DEFAULT_RPC_TIMEOUT_SECS,
            )?),
        })
    }
}
