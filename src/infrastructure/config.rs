use std::env;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("SEED_USER_EMAIL and SEED_USER_PASSWORD must be set together")]
    IncompleteSeedUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub page_size: usize,
    pub log_level: String,
    pub cors_allowed_origin: Option<String>,
    pub seed_user: Option<SeedUser>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            cors_allowed_origin: None,
            seed_user: None,
        }
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let page_size = match non_empty("TODO_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "TODO_PAGE_SIZE",
                        value: raw,
                    });
                }
            },
            None => defaults.page_size,
        };

        let seed_user = match (non_empty("SEED_USER_EMAIL"), non_empty("SEED_USER_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedUser { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteSeedUser),
        };

        Ok(Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            page_size,
            log_level: non_empty("LOG_LEVEL").unwrap_or(defaults.log_level),
            cors_allowed_origin: non_empty("CORS_ALLOWED_ORIGIN"),
            seed_user,
        })
    }
}
