use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Port used when `PORT` is unset or blank.
pub const DEFAULT_PORT: u16 = 3000;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configuration was installed more than once.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Runtime configuration for the learning topics server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TCP port the HTTP server listens on.
    pub server_port: u16,
    /// Optional path that log output is appended to.
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Ok(Self {
            server_port: optional("PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("PORT".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
            log_file: optional("LEARNAPP_LOG_FILE"),
        })
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, falling back to defaults when none was installed.
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// Load configuration from `.env` and the environment, then install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        server_port = config.server_port,
        log_file = ?config.log_file,
        "Loaded configuration"
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(get_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_port_3000() {
        let config = load(&[]).expect("config");
        assert_eq!(config, Config::default());
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn blank_port_uses_default() {
        let config = load(&[("PORT", "  ")]).expect("config");
        assert_eq!(config.server_port, DEFAULT_PORT);
    }

    #[test]
    fn reads_port_and_log_file() {
        let config = load(&[("PORT", "8080"), ("LEARNAPP_LOG_FILE", "/tmp/learnapp.log")])
            .expect("config");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.log_file.as_deref(), Some("/tmp/learnapp.log"));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let err = load(&[("PORT", "http")]).expect_err("invalid port");
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "PORT"));
    }
}
