use loanhub_core::config::{self, ConfigError};
use loanhub_rpc::config::{ListenConfig, TransportConfig};

pub const DEFAULT_PORT: u16 = 50053;

/// Ledger service configuration: `HOST`, `PORT` (50053), `TRUST_TOKEN`,
/// `RPC_TIMEOUT_SECS`, and an optional `DATABASE_URL`.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub listen: ListenConfig,
    pub transport: TransportConfig,
    pub database_url: Option<String>,
}

impl LedgerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            listen: ListenConfig::from_env(DEFAULT_PORT)?,
            transport: TransportConfig::from_env()?,
            database_url: config::optional("DATABASE_URL"),
        })
    }
}
