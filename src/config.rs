use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::DEFAULT_VIEWER_BUFFER;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated
    pub cors_origins: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Secret used to sign and validate auth tokens
    pub auth_jwt_secret: Option<String>,

    /// Lifetime of issued auth tokens in seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Number of snapshots a viewer may have pending before delivery waits
    #[serde(default = "default_viewer_buffer")]
    pub viewer_buffer: usize,

    /// Directory holding the web app
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        envy::from_env::<Config>().map_err(ConfigError::EnvError)
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }

    /// Parsed list of allowed CORS origins, empty when unset
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            cors_origins: None,
            auth_jwt_secret: None,
            token_ttl_secs: default_token_ttl_secs(),
            viewer_buffer: default_viewer_buffer(),
            public_dir: default_public_dir(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvError(#[from] envy::Error),
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_token_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_viewer_buffer() -> usize {
    DEFAULT_VIEWER_BUFFER
}

fn default_public_dir() -> String {
    "public".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_variables() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert_eq!(config.viewer_buffer, 10);
        assert_eq!(config.token_ttl_secs, 86_400);
        assert!(config.is_development());
        assert!(config.auth_jwt_secret.is_none());
    }

    #[test]
    fn variables_override_defaults() {
        let vars = vec![
            ("PORT".to_string(), "9000".to_string()),
            ("VIEWER_BUFFER".to_string(), "3".to_string()),
            ("ENVIRONMENT".to_string(), "prod".to_string()),
            ("CORS_ORIGINS".to_string(), "http://a.test, http://b.test,".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.viewer_buffer, 3);
        assert!(!config.is_development());
        assert_eq!(config.cors_origin_list(), vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let vars = vec![("PORT".to_string(), "not-a-port".to_string())];
        let err = envy::from_iter::<_, Config>(vars).map_err(ConfigError::EnvError).unwrap_err();
        assert!(err.to_string().starts_with("Environment variable error"));
    }
}
