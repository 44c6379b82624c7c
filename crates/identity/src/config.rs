use loanhub_core::config::{self, ConfigError};
use loanhub_rpc::config::{ListenConfig, TransportConfig};

use crate::jwt::{JwtConfig, DEFAULT_EXPIRY_HOURS, MAX_EXPIRY_HOURS};
use crate::password::PasswordConfig;

pub const DEFAULT_PORT: u16 = 50051;
const DEFAULT_LEDGER_URL: &str = "http://localhost:50053";

/// Credentials for an admin account created at startup if absent.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

/// Identity service configuration.
///
/// | Env Var                    | Default                  |
/// |----------------------------|--------------------------|
/// | `HOST` / `PORT`            | `0.0.0.0` / `50051`      |
/// | `TRUST_TOKEN`              | **required**             |
/// | `RPC_TIMEOUT_SECS`         | `10`                     |
/// | `DATABASE_URL`             | unset: in-memory store   |
/// | `JWT_SECRET`               | **required**             |
/// | `JWT_EXPIRY_HOURS`         | `24`, at most `8760`     |
/// | `LEDGER_SERVICE_URL`       | `http://localhost:50053` |
/// | `PASSWORD_MEMORY_KIB`      | Argon2 default           |
/// | `PASSWORD_ITERATIONS`      | Argon2 default           |
/// | `BOOTSTRAP_ADMIN_USERNAME` | unset                    |
/// | `BOOTSTRAP_ADMIN_PASSWORD` | unset                    |
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub listen: ListenConfig,
    pub transport: TransportConfig,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub ledger_url: String,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = PasswordConfig::default();

        let bootstrap_admin = match (
            config::optional("BOOTSTRAP_ADMIN_USERNAME"),
            config::optional("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            (Some(_), None) => return Err(ConfigError::Missing("BOOTSTRAP_ADMIN_PASSWORD")),
            _ => None,
        };

        Ok(Self {
            listen: ListenConfig::from_env(DEFAULT_PORT)?,
            transport: TransportConfig::from_env()?,
            database_url: config::optional("DATABASE_URL"),
            jwt: JwtConfig {
                secret: config::required("JWT_SECRET")?,
                expiry_hours: expiry_hours(config::parse_or(
                    "JWT_EXPIRY_HOURS",
                    DEFAULT_EXPIRY_HOURS,
                )?)?,
            },
            password: PasswordConfig {
                memory_kib: config::parse_or("PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
                iterations: config::parse_or("PASSWORD_ITERATIONS", defaults.iterations)?,
            },
            ledger_url: config::or_default("LEDGER_SERVICE_URL", DEFAULT_LEDGER_URL),
            bootstrap_admin,
        })
    }
}

fn expiry_hours(hours: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_EXPIRY_HOURS).contains(&hours) {
        return Ok(hours);
    }
    Err(ConfigError::Invalid {
        key: "JWT_EXPIRY_HOURS",
        value: hours.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn expiry_hours_must_fit_one_year() {
        assert_matches!(expiry_hours(1), Ok(1));
        assert_matches!(expiry_hours(MAX_EXPIRY_HOURS), Ok(MAX_EXPIRY_HOURS));
        for bad in [0, -1, MAX_EXPIRY_HOURS + 1, i64::MAX] {
            assert_matches!(
                expiry_hours(bad),
                Err(ConfigError::Invalid { key: "JWT_EXPIRY_HOURS", .. })
            );
        }
    }
}
