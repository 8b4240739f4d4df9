use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::render::filename::DEFAULT_PREFIX;
use crate::render::DEFAULT_PRODUCT_NAME;

/// Application configuration loaded from environment variables.
/// Every variable has a default except `EXPORT_DIR`, which is optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Footer label and PDF producer.
    pub product_name: String,
    /// Filename tag used when a request supplies none.
    pub export_prefix: String,
    /// When set, every rendered PDF is also saved here.
    pub export_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            product_name: env_or("PRODUCT_NAME", DEFAULT_PRODUCT_NAME),
            export_prefix: env_or("EXPORT_PREFIX", DEFAULT_PREFIX),
            export_dir: optional_env("EXPORT_DIR").map(PathBuf::from),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            export_prefix: DEFAULT_PREFIX.to_string(),
            export_dir: None,
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
