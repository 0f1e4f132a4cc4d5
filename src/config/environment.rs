// Start of file: /src/config/environment.rs

// * Explicit environment configuration, validated once at startup.
// * Missing or malformed required values abort the boot instead of surfacing per request.

use std::{borrow::Cow, collections::HashMap};
// * anyhow for convenient error handling
use anyhow::{anyhow, bail, Context, Result};
// * once_cell for lazy static initialization
use once_cell::sync::Lazy;
use tracing::warn;

use crate::config::profiles::ProfileRegistry;

// ! Default values for environment variables (used if variables aren't set):
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_BODY_SIZE: usize = 2_097_152; // 2MB
const DEFAULT_TIMEOUT: u64 = 30; // whole request
const DEFAULT_DB_CONNECT_TIMEOUT: u64 = 10;
const DEFAULT_DB_QUERY_TIMEOUT: u64 = 15;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_POOL_CACHE_CAPACITY: usize = 16;

// * A struct containing all environment variables used by the app
#[derive(Clone, Debug)]
pub struct EnvironmentVariables {
    pub environment: Cow<'static, str>,
    pub host: Cow<'static, str>,
    pub port: u16,
    pub max_request_body_size: usize,
    pub default_timeout_seconds: u64,
    pub profiles: ProfileRegistry,
    pub db_connect_timeout_seconds: u64,
    pub db_query_timeout_seconds: u64,
    pub db_max_connections: u32,
    /// 0 disables pooling: every request connects, queries and disconnects
    pub pool_cache_capacity: usize,
}

impl EnvironmentVariables {
    // * Reads the process environment.
    // * Only reads .env if ENVIRONMENT != "production".
    pub fn load() -> Result<Self> {
        if std::env::var("ENVIRONMENT").unwrap_or_default() != "production" {
            dotenv::dotenv().ok();
        }

        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    // * Builds the configuration from any key lookup (the environment, or a map in tests).
    // * Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config: Self = Self {
            environment: get_var("ENVIRONMENT")
                .map(Cow::Owned)
                .unwrap_or_else(|| {
                    warn!("Missing ENVIRONMENT, defaulting to '{DEFAULT_ENVIRONMENT}'");
                    Cow::Borrowed(DEFAULT_ENVIRONMENT)
                }),

            host: get_var("HOST")
                .map(Cow::Owned)
                .unwrap_or(Cow::Borrowed(DEFAULT_HOST)),

            port: get_var("PORT")
                .map(|s| s.parse().context("Invalid PORT value"))
                .transpose()?
                .unwrap_or(DEFAULT_PORT),

            max_request_body_size: get_var("MAX_REQUEST_BODY_SIZE")
                .map(|s| s.parse().context("Invalid MAX_REQUEST_BODY_SIZE"))
                .transpose()?
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),

            default_timeout_seconds: get_var("DEFAULT_TIMEOUT_SECONDS")
                .map(|s| s.parse().context("Invalid DEFAULT_TIMEOUT_SECONDS"))
                .transpose()?
                .unwrap_or(DEFAULT_TIMEOUT),

            profiles: ProfileRegistry::from_lookup(&get_var)
                .context("Invalid database profile configuration")?,

            db_connect_timeout_seconds: get_var("DB_CONNECT_TIMEOUT_SECONDS")
                .map(|s| s.parse().context("Invalid DB_CONNECT_TIMEOUT_SECONDS"))
                .transpose()?
                .unwrap_or(DEFAULT_DB_CONNECT_TIMEOUT),

            db_query_timeout_seconds: get_var("DB_QUERY_TIMEOUT_SECONDS")
                .map(|s| s.parse().context("Invalid DB_QUERY_TIMEOUT_SECONDS"))
                .transpose()?
                .unwrap_or(DEFAULT_DB_QUERY_TIMEOUT),

            db_max_connections: get_var("DB_MAX_CONNECTIONS")
                .map(|s| s.parse().context("Invalid DB_MAX_CONNECTIONS"))
                .transpose()?
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),

            pool_cache_capacity: get_var("POOL_CACHE_CAPACITY")
                .map(|s| s.parse().context("Invalid POOL_CACHE_CAPACITY"))
                .transpose()?
                .unwrap_or(DEFAULT_POOL_CACHE_CAPACITY),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.db_max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if self.db_connect_timeout_seconds == 0 || self.db_query_timeout_seconds == 0 {
            bail!("DB_CONNECT_TIMEOUT_SECONDS and DB_QUERY_TIMEOUT_SECONDS must be positive");
        }
        if self.default_timeout_seconds <= self.db_connect_timeout_seconds + self.db_query_timeout_seconds {
            warn!(
                "DEFAULT_TIMEOUT_SECONDS ({}) does not exceed connect + query timeouts ({} + {}); slow lookups will end as 408",
                self.default_timeout_seconds,
                self.db_connect_timeout_seconds,
                self.db_query_timeout_seconds
            );
        }
        Ok(())
    }

    pub fn is_pooled(&self) -> bool {
        self.pool_cache_capacity > 0
    }

    // * Returns a reference to the lazily-initialized environment configuration
    pub fn instance() -> Result<&'static Self> {
        static INSTANCE: Lazy<Result<EnvironmentVariables, anyhow::Error>> = Lazy::new(|| {
            let config: EnvironmentVariables = EnvironmentVariables::load()?;

            if cfg!(debug_assertions) {
                tracing::debug!("Loaded environment configuration: {:#?}", config);
            }

            Ok(config)
        });

        INSTANCE
            .as_ref()
            .map_err(|err| anyhow!("Failed to load environment configuration: {err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<EnvironmentVariables> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvironmentVariables::from_lookup(|key| vars.get(key).cloned())
    }

    const CREDENTIALS: [(&str, &str); 3] = [
        ("DB_USER", "reader"),
        ("DB_PASSWORD", "secret"),
        ("DB_NAME", "store"),
    ];

    #[test]
    fn defaults_apply_when_unset() {
        let env = load(&CREDENTIALS).unwrap();

        assert_eq!(env.environment, "development");
        assert_eq!(env.host, "127.0.0.1");
        assert_eq!(env.port, 3000);
        assert_eq!(env.default_timeout_seconds, 30);
        assert_eq!(env.db_connect_timeout_seconds, 10);
        assert_eq!(env.db_query_timeout_seconds, 15);
        assert_eq!(env.pool_cache_capacity, 16);
        assert!(env.is_pooled());
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.extend([("PORT", "3001"), ("POOL_CACHE_CAPACITY", "0"), ("HOST", "0.0.0.0")]);
        let env = load(&pairs).unwrap();

        assert_eq!(env.port, 3001);
        assert_eq!(env.host, "0.0.0.0");
        assert!(!env.is_pooled());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("PORT", "  "));
        assert_eq!(load(&pairs).unwrap().port, 3000);
    }

    #[test]
    fn invalid_numbers_fail_fast() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("PORT", "not-a-port"));
        let err = load(&pairs).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn missing_profile_fails_fast() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn zero_connections_is_rejected() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("DB_MAX_CONNECTIONS", "0"));
        assert!(load(&pairs).is_err());
    }
}

// End of file: /src/config/environment.rs
