use std::net::SocketAddr;
use std::time::Duration;
use zeroize::Zeroizing;

use crate::persistence::DatabaseConfig;
use crate::secrets::{
    decode_cipher_key, parse_api_keys, require_secret, validate_secret_strength, SecretError,
    MIN_SECRET_LENGTH,
};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Secret(#[from] SecretError),

    #[error("Invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, assembled once at startup and passed into constructors
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub crypto_key: Zeroizing<Vec<u8>>,
    pub jwt_secret: Zeroizing<String>,
    pub admin_api_keys: Vec<Zeroizing<String>>,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database", &self.database)
            .field("crypto_key", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("admin_api_keys", &self.admin_api_keys.len())
            .field("bind_addr", &self.bind_addr)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<AppConfig, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any name -> value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig, ConfigError> {
        let crypto_key = decode_cipher_key(&require_secret(&lookup, "CRYPTO_KEY")?)?;

        let jwt_secret = require_secret(&lookup, "JWT_SECRET")?;
        validate_secret_strength(&jwt_secret, MIN_SECRET_LENGTH)?;

        let admin_api_keys = parse_api_keys(&require_secret(&lookup, "ADMIN_API_KEYS")?)?;

        let bind_addr = match lookup("BIND_ADDR") {
            Some(addr) => addr.parse().map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDR",
                value: addr,
            })?,
            None => DEFAULT_BIND_ADDR.parse().map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDR",
                value: DEFAULT_BIND_ADDR.to_string(),
            })?,
        };

        let mut request_timeout = Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS);
        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(value) if (1..=300).contains(&value) => {
                    request_timeout = Duration::from_secs(value);
                }
                Ok(value) => {
                    tracing::warn!(
                        "Invalid REQUEST_TIMEOUT_SECS value: {} (must be between 1 and 300), using default: {}",
                        value, DEFAULT_REQUEST_TIMEOUT_SECS
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse REQUEST_TIMEOUT_SECS '{}': {}, using default: {}",
                        secs,
                        e,
                        DEFAULT_REQUEST_TIMEOUT_SECS
                    );
                }
            }
        }

        Ok(AppConfig {
            database: DatabaseConfig::from_lookup(&lookup),
            crypto_key,
            jwt_secret,
            admin_api_keys,
            bind_addr,
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::collections::HashMap;

    fn env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("CRYPTO_KEY", STANDARD.encode([9u8; 32])),
            ("JWT_SECRET", "j".repeat(48)),
            ("ADMIN_API_KEYS", format!("{},{}", "a".repeat(32), "b".repeat(32))),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&env()).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.database.url, "sqlite://data/tourney.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.crypto_key.as_slice(), &[9u8; 32]);
        assert_eq!(config.admin_api_keys.len(), 2);
    }

    #[test]
    fn test_overrides() {
        let mut vars = env();
        vars.insert("BIND_ADDR", "0.0.0.0:9000".to_string());
        vars.insert("REQUEST_TIMEOUT_SECS", "30".to_string());
        vars.insert("DATABASE_URL", "sqlite::memory:".to_string());
        vars.insert("DATABASE_MAX_CONNECTIONS", "12".to_string());

        let config = load(&vars).unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 12);
    }

    #[test]
    fn test_out_of_range_timeout_falls_back() {
        let mut vars = env();
        vars.insert("REQUEST_TIMEOUT_SECS", "0".to_string());
        assert_eq!(load(&vars).unwrap().request_timeout, Duration::from_secs(10));

        vars.insert("REQUEST_TIMEOUT_SECS", "soon".to_string());
        assert_eq!(load(&vars).unwrap().request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_or_weak_secrets() {
        for name in ["CRYPTO_KEY", "JWT_SECRET", "ADMIN_API_KEYS"] {
            let mut vars = env();
            vars.remove(name);
            assert!(matches!(
                load(&vars),
                Err(ConfigError::Secret(SecretError::EnvVarNotSet(_)))
            ));
        }

        let mut vars = env();
        vars.insert("CRYPTO_KEY", STANDARD.encode([1u8; 16]));
        assert!(load(&vars).is_err());

        let mut vars = env();
        vars.insert("JWT_SECRET", "too-short".to_string());
        assert!(load(&vars).is_err());

        let mut vars = env();
        vars.insert("BIND_ADDR", "nowhere".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: "BIND_ADDR", .. })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&env()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(&"j".repeat(48)));
    }
}
