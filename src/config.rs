//! Config module contains the top-level config for the app.
use std::env;

use config_crate::{Config as RawConfig, ConfigError, Environment, File};

use sentry_integration::SentryConfig;

/// Basic settings - HTTP binding address and database DSN
#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub host: String,
    pub port: String,
    pub database: String,
    pub thread_count: usize,
}

/// Token signing settings
#[derive(Debug, Deserialize, Clone)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_ttl_sec: i64,
}

/// Defaults for paginated listings
#[derive(Debug, Deserialize, Clone)]
pub struct Listing {
    pub default_count: i64,
}

/// Service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: Server,
    pub auth: Auth,
    pub listing: Listing,
    pub sentry: Option<SentryConfig>,
}

impl Config {
    /// Creates config from base.toml, which are overwritten by <env>.toml, where env is one of development,
    /// test, production. After that it could be overwritten by env variables like STQ_CATALOGUE__SERVER__PORT
    pub fn new() -> Result<Self, ConfigError> {
        // Optional file specific for environment
        let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Config::with_env(env)
    }

    pub fn with_env(env: impl Into<String>) -> Result<Self, ConfigError> {
        let mut s = RawConfig::new();

        s.merge(File::with_name("config/base"))?;
        s.merge(File::with_name(&format!("config/{}", env.into())).required(false))?;
        s.merge(Environment::with_prefix("STQ_CATALOGUE").separator("__"))?;
        s.try_into()
    }
}
