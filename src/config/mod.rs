//! Application configuration management

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use base64::Engine;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    fn from_env_value(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => bail!("Invalid LOG_FORMAT '{}': expected 'json' or 'pretty'", other),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (informational, used in startup logs)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// SQLite URL, e.g. `sqlite:blog.db`
    pub database_url: String,

    /// Maximum pooled database connections
    pub database_max_connections: u32,

    /// How long to keep retrying the initial database connection
    pub database_connect_timeout: Duration,

    /// JWT secret for token verification
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub access_token_lifetime: i64,

    /// Insert demo users and posts on startup when the database is empty
    pub seed_demo_data: bool,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: None,
            port: 3001,
            database_url: "sqlite:blog.db".to_string(),
            database_max_connections: 10,
            database_connect_timeout: Duration::from_secs(30),
            jwt_secret: String::new(),
            access_token_lifetime: 15 * 60,
            seed_demo_data: false,
            log_format: LogFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        // Prefer DATABASE_PATH, fall back to DATABASE_URL
        let database_url = env::var("DATABASE_PATH")
            .map(|path| format!("sqlite:{}", path))
            .or_else(|_| env::var("DATABASE_URL"))
            .unwrap_or(defaults.database_url);

        Ok(Self {
            host: env::var("HOST").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.database_max_connections),

            database_connect_timeout: env::var("DATABASE_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.database_connect_timeout),

            jwt_secret: env::var("JWT_SECRET")
                .map(|s| s.trim().to_string())
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(generate_dev_secret),

            access_token_lifetime: match env::var("ACCESS_TOKEN_LIFETIME") {
                Ok(v) => v.parse().context("Invalid ACCESS_TOKEN_LIFETIME")?,
                Err(_) => defaults.access_token_lifetime,
            },

            seed_demo_data: env::var("SEED_DEMO_DATA")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),

            log_format: match env::var("LOG_FORMAT") {
                Ok(v) => LogFormat::from_env_value(&v)?,
                Err(_) => defaults.log_format,
            },
        })
    }

    /// Whether the JWT secret was generated because JWT_SECRET was not set
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret.starts_with(DEV_SECRET_PREFIX)
    }
}

const DEV_SECRET_PREFIX: &str = "dev-secret-";

/// Random per-process secret for development. Tokens do not survive restarts.
fn generate_dev_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    format!(
        "{}{}",
        DEV_SECRET_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_env_value("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(" Pretty ").unwrap(), LogFormat::Pretty);
        assert!(LogFormat::from_env_value("xml").is_err());
    }

    #[test]
    fn test_dev_secret_is_random() {
        let a = generate_dev_secret();
        let b = generate_dev_secret();
        assert_ne!(a, b);
        assert!(a.starts_with(DEV_SECRET_PREFIX));
    }
}
