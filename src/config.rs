use std::env;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5002;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("POSTS_PORT must be an integer in 1..=65535, got {0:?}")]
    InvalidPort(String),
    #[error("POSTS_SEED must be true/false, got {0:?}")]
    InvalidSeed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Start with the demo posts instead of an empty store.
    pub seed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            seed: true,
        }
    }
}

impl Config {
    /// Reads `POSTS_HOST`, `POSTS_PORT` and `POSTS_SEED`, after loading `.env` if present.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenvy::dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(host) = lookup("POSTS_HOST") {
            if !host.trim().is_empty() {
                config.host = host.trim().to_string();
            }
        }

        if let Some(port) = lookup("POSTS_PORT") {
            config.port = match port.trim().parse::<u16>() {
                Ok(p) if p > 0 => p,
                _ => return Err(ConfigError::InvalidPort(port)),
            };
        }

        if let Some(seed) = lookup("POSTS_SEED") {
            config.seed = match seed.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(ConfigError::InvalidSeed(seed)),
            };
        }

        Ok(config)
    }

    pub fn addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}
