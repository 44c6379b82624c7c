use loanhub_core::config::{self, ConfigError};
use loanhub_rpc::config::{ListenConfig, TransportConfig};

pub const DEFAULT_PORT: u16 = 50052;
const DEFAULT_IDENTITY_URL: &str = "http://localhost:50051";
const DEFAULT_LEDGER_URL: &str = "http://localhost:50053";

/// Loan service configuration.
///
/// | Env Var                | Default                  |
/// |------------------------|--------------------------|
/// | `HOST` / `PORT`        | `0.0.0.0` / `50052`      |
/// | `TRUST_TOKEN`          | **required**             |
/// | `RPC_TIMEOUT_SECS`     | `10`                     |
/// | `DATABASE_URL`         | unset: in-memory store   |
/// | `IDENTITY_SERVICE_URL` | `http://localhost:50051` |
/// | `LEDGER_SERVICE_URL`   | `http://localhost:50053` |
#[derive(Debug, Clone)]
pub struct LoanConfig {
    pub listen: ListenConfig,
    pub transport: TransportConfig,
    pub database_url: Option<String>,
    pub identity_url: String,
    pub ledger_url: String,
}

impl LoanConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            listen: ListenConfig::from_env(DEFAULT_PORT)?,
            transport: TransportConfig::from_env()?,
            database_url: config::optional("DATABASE_URL"),
            identity_url: config::or_default("IDENTITY_SERVICE_URL", DEFAULT_IDENTITY_URL),
            ledger_url: config::or_default("LEDGER_SERVICE_URL", DEFAULT_LEDGER_URL),
        })
    }
}
