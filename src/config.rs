use std::{net::SocketAddr, path::PathBuf};

use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name}={value}: expected a socket address like 127.0.0.1:3000")]
    InvalidAddr { name: &'static str, value: String },

    #[error("invalid {name}={value}: expected true/false")]
    InvalidBool { name: &'static str, value: String },
}

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    // Split from from_env so tests do not have to mutate process env
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("PORTFOLIO_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse().map_err(|_| ConfigError::InvalidAddr {
            name: "PORTFOLIO_BIND",
            value: bind_raw.clone(),
        })?;

        let data_dir = lookup("PORTFOLIO_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let static_dir =
            lookup("PORTFOLIO_STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

        let log_json = match lookup("PORTFOLIO_LOG_JSON") {
            None => false,
            Some(v) => parse_bool(&v).ok_or(ConfigError::InvalidBool {
                name: "PORTFOLIO_LOG_JSON",
                value: v,
            })?,
        };

        Ok(Self {
            bind,
            data_dir: PathBuf::from(data_dir),
            static_dir: PathBuf::from(static_dir),
            log_json,
        })
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" | "" => Some(false),
        _ => None,
    }
}
