use axum::http::HeaderValue;
use loanhub_core::config::{self, ConfigError};
use loanhub_rpc::config::{ListenConfig, TransportConfig};

pub const DEFAULT_PORT: u16 = 3000;
const DEFAULT_IDENTITY_URL: &str = "http://localhost:50051";
const DEFAULT_LOAN_URL: &str = "http://localhost:50052";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Gateway configuration loaded from environment variables.
///
/// | Env Var                | Default                    |
/// |------------------------|----------------------------|
/// | `HOST` / `PORT`        | `0.0.0.0` / `3000`         |
/// | `TRUST_TOKEN`          | **required**               |
/// | `RPC_TIMEOUT_SECS`     | `10`                       |
/// | `IDENTITY_SERVICE_URL` | `http://localhost:50051`   |
/// | `LOAN_SERVICE_URL`     | `http://localhost:50052`   |
/// | `CORS_ORIGINS`         | `http://localhost:5173`    |
/// | `REQUEST_TIMEOUT_SECS` | `30`                       |
/// | `APP_URL`              | unset (host-only cookie)   |
/// | `MODE`                 | `production` sets `Secure` |
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen: ListenConfig,
    pub transport: TransportConfig,
    pub identity_url: String,
    pub loan_url: String,
    pub cors_origins: Vec<HeaderValue>,
    pub request_timeout_secs: u64,
    /// Domain attribute for the session cookie.
    pub cookie_domain: Option<String>,
    pub secure_cookies: bool,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            listen: ListenConfig::from_env(DEFAULT_PORT)?,
            transport: TransportConfig::from_env()?,
            identity_url: config::or_default("IDENTITY_SERVICE_URL", DEFAULT_IDENTITY_URL),
            loan_url: config::or_default("LOAN_SERVICE_URL", DEFAULT_LOAN_URL),
            cors_origins: parse_origins(&config::or_default("CORS_ORIGINS", DEFAULT_CORS_ORIGINS))?,
            request_timeout_secs: config::parse_or(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            cookie_domain: config::optional("APP_URL"),
            secure_cookies: config::is_production(),
        })
    }
}

/// Split a comma-separated origin list, rejecting values that cannot be a
/// header.
pub fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::Invalid {
                key: "CORS_ORIGINS",
                value: origin.to_string(),
            })
        })
        .collect()
}
