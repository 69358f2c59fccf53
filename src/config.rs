//! Startup configuration
//!
//! The listening port and the allowed cross-origin source are supplied
//! through the environment; absence of either is fatal before the
//! server binds (fail fast, no silent defaults).

use std::env;

use thiserror::Error;

/// Environment variable naming the listening port
pub const PORT_VAR: &str = "PORT";
/// Environment variable naming the allowed browser origin
pub const ALLOWED_ORIGIN_VAR: &str = "ALLOWED_ORIGIN";

/// Configuration errors, fatal at startup only
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A required environment variable is absent or empty
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// PORT is present but not a valid port number
    #[error("Invalid port value: {0}")]
    InvalidPort(String),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port to listen on
    pub port: u16,
    /// Origin header value admitted during the WebSocket handshake
    pub allowed_origin: String,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::var(PORT_VAR).ok(), env::var(ALLOWED_ORIGIN_VAR).ok())
    }

    fn from_vars(port: Option<String>, origin: Option<String>) -> Result<Self, ConfigError> {
        let port_raw = port
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(PORT_VAR))?;
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port_raw.clone()))?;

        let allowed_origin = origin
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(ALLOWED_ORIGIN_VAR))?
            .trim()
            .to_string();

        Ok(Self {
            port,
            allowed_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_config() {
        let config = Config::from_vars(
            Some("3012".to_string()),
            Some("http://localhost:5173".to_string()),
        )
        .unwrap();
        assert_eq!(config.port, 3012);
        assert_eq!(config.allowed_origin, "http://localhost:5173");
    }

    #[test]
    fn test_missing_port_is_fatal() {
        let err = Config::from_vars(None, Some("http://localhost:5173".to_string())).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(PORT_VAR));
    }

    #[test]
    fn test_missing_origin_is_fatal() {
        let err = Config::from_vars(Some("3012".to_string()), None).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(ALLOWED_ORIGIN_VAR));
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let err = Config::from_vars(Some("  ".to_string()), Some("x".to_string())).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(PORT_VAR));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = Config::from_vars(
            Some("not-a-port".to_string()),
            Some("http://localhost:5173".to_string()),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort("not-a-port".to_string()));
    }
}
