//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crm_session::SessionConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// File backing the persistent token store
    pub store_path: PathBuf,

    /// Session behaviour
    pub session: SessionConfig,

    /// Runtime configuration
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = SessionConfig::default();

        let session = SessionConfig {
            storage_key: env::var("SESSION_STORAGE_KEY").unwrap_or(defaults.storage_key),
            authenticated_route: env::var("SESSION_HOME_ROUTE")
                .unwrap_or(defaults.authenticated_route),
            unauthenticated_route: env::var("SESSION_LOGIN_ROUTE")
                .unwrap_or(defaults.unauthenticated_route),
            enforce_expiry: match env::var("SESSION_ENFORCE_EXPIRY") {
                Ok(value) => parse_bool(&value)
                    .with_context(|| format!("SESSION_ENFORCE_EXPIRY is not a boolean: {value}"))?,
                Err(_) => defaults.enforce_expiry,
            },
            expiry_leeway_secs: match env::var("SESSION_EXPIRY_LEEWAY_SECS") {
                Ok(value) => value
                    .trim()
                    .parse()
                    .with_context(|| format!("SESSION_EXPIRY_LEEWAY_SECS is not a number: {value}"))?,
                Err(_) => defaults.expiry_leeway_secs,
            },
        };

        if session.storage_key.trim().is_empty() {
            anyhow::bail!("SESSION_STORAGE_KEY must not be empty");
        }

        let config = Self {
            store_path: env::var("SESSION_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".crm-session.json")),
            session,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "crm_session=info".to_string()),
        };

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
