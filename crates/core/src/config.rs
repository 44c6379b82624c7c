//! Helpers for reading service configuration from environment variables.
//!
//! Every binary builds one immutable config value at startup from these
//! helpers and passes it down explicitly.

use std::str::FromStr;

/// Value of `MODE` that enables production behaviour (secure cookies, no `.env`).
pub const MODE_PRODUCTION: &str = "production";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Read a required, non-empty variable.
pub fn required(key: &'static str) -> Result<String, ConfigError> {
    let value = std::env::var(key).map_err(|_| ConfigError::Missing(key))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(value)
}

/// Read an optional variable; empty values count as unset.
pub fn optional(key: &'static str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Read a variable or fall back to `default`.
pub fn or_default(key: &'static str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

/// Read and parse a variable, falling back to `default` when unset.
pub fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// Whether `MODE` is set to production.
pub fn is_production() -> bool {
    optional("MODE").is_some_and(|mode| mode == MODE_PRODUCTION)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // Each test uses its own variable name so parallel tests don't race.

    #[test]
    fn required_reports_missing_and_empty() {
        assert_matches!(
            required("LOANHUB_TEST_REQUIRED_MISSING"),
            Err(ConfigError::Missing("LOANHUB_TEST_REQUIRED_MISSING"))
        );
        std::env::set_var("LOANHUB_TEST_REQUIRED_EMPTY", "  ");
        assert_matches!(
            required("LOANHUB_TEST_REQUIRED_EMPTY"),
            Err(ConfigError::Empty(_))
        );
    }

    #[test]
    fn parse_or_uses_default_and_reports_garbage() {
        assert_eq!(parse_or("LOANHUB_TEST_PORT_UNSET", 50051u16).unwrap(), 50051);
        std::env::set_var("LOANHUB_TEST_PORT_BAD", "eighty");
        assert_matches!(
            parse_or("LOANHUB_TEST_PORT_BAD", 80u16),
            Err(ConfigError::Invalid { key: "LOANHUB_TEST_PORT_BAD", .. })
        );
        std::env::set_var("LOANHUB_TEST_PORT_OK", " 8080 ");
        assert_eq!(parse_or("LOANHUB_TEST_PORT_OK", 80u16).unwrap(), 8080);
    }
}
