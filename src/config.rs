//! Start-up configuration for both binaries.
//!
//! Values come from the environment; a `.env` file is loaded first when
//! present. Parsing goes through a lookup function so it can be exercised
//! without touching the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_POOL_SIZE: usize = 8;
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Configuration of the HTTP resource service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool_size: usize,
    /// Courses to insert when the table is empty.
    pub courses_json_path: Option<PathBuf>,
    /// Enables a permissive CORS layer.
    pub local_dev_deployment: bool,
    pub log_level: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(ServiceConfig {
            database_url: required(&lookup, "DATABASE_URL")?,
            bind_addr: parse_or(&lookup, "BIND_ADDR", || {
                SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
            })?,
            pool_size: parse_or(&lookup, "DB_POOL_SIZE", || DEFAULT_POOL_SIZE)?,
            courses_json_path: lookup("COURSES_JSON_PATH").map(PathBuf::from),
            local_dev_deployment: lookup("LOCAL_DEV_DEPLOYMENT").is_some(),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

/// Configuration of the chat bot.
#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    /// Base URL of the resource service, without a trailing slash.
    pub backend_base_url: String,
    pub telegram_api_url: String,
    pub poll_timeout: Duration,
    pub log_level: String,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"[REDACTED]")
            .field("backend_base_url", &self.backend_base_url)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_timeout", &self.poll_timeout)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_base_url = lookup("BACKEND_BASE_URL")
            .or_else(|| lookup("FASTAPI_BASE_URL"))
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("BACKEND_BASE_URL"))?;

        Ok(BotConfig {
            bot_token: required(&lookup, "BOT_TOKEN")?,
            backend_base_url: backend_base_url.trim().trim_end_matches('/').to_string(),
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            poll_timeout: Duration::from_secs(parse_or(&lookup, "POLL_TIMEOUT_SECS", || {
                DEFAULT_POLL_TIMEOUT_SECS
            })?),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default()),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn service_defaults() {
        let config = assert_ok!(ServiceConfig::from_lookup(env(&[(
            "DATABASE_URL",
            "postgres://localhost/resources"
        )])));
        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.courses_json_path, None);
        assert!(!config.local_dev_deployment);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn service_requires_database_url() {
        let err = assert_err!(ServiceConfig::from_lookup(env(&[])));
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn service_rejects_bad_bind_addr() {
        let err = assert_err!(ServiceConfig::from_lookup(env(&[
            ("DATABASE_URL", "postgres://localhost/resources"),
            ("BIND_ADDR", "localhost"),
        ])));
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "BIND_ADDR",
                value: "localhost".to_string()
            }
        );
    }

    #[test]
    fn bot_accepts_legacy_backend_variable() {
        let config = assert_ok!(BotConfig::from_lookup(env(&[
            ("BOT_TOKEN", "123:abc"),
            ("FASTAPI_BASE_URL", "http://backend:8000/"),
        ])));
        assert_eq!(config.backend_base_url, "http://backend:8000");
        assert_eq!(config.telegram_api_url, "https://api.telegram.org");
        assert_eq!(config.poll_timeout, Duration::from_secs(30));
    }

    #[test]
    fn bot_requires_token_and_backend() {
        assert_eq!(
            assert_err!(BotConfig::from_lookup(env(&[("BOT_TOKEN", "123:abc")]))),
            ConfigError::Missing("BACKEND_BASE_URL")
        );
        assert_eq!(
            assert_err!(BotConfig::from_lookup(env(&[(
                "BACKEND_BASE_URL",
                "http://backend"
            )]))),
            ConfigError::Missing("BOT_TOKEN")
        );
    }

    #[test]
    fn bot_token_is_redacted() {
        let config = assert_ok!(BotConfig::from_lookup(env(&[
            ("BOT_TOKEN", "123:secret"),
            ("BACKEND_BASE_URL", "http://backend"),
        ])));
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("[REDACTED]"));
    }
}
