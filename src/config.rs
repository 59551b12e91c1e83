// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Backend base URL used when `API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Request timeout used when `API_TIMEOUT_SECS` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Laundry backend base URL (including the `/api` prefix)
    pub api_url: String,
    /// Connect + response timeout for every backend request
    pub request_timeout: Duration,
    /// File holding the persisted bearer token
    pub token_file: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_file: env::temp_dir().join("laundry-admin-test").join("token"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = env::var("API_URL")
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                tracing::debug!(fallback = DEFAULT_API_URL, "API_URL not set");
                DEFAULT_API_URL.to_string()
            });

        let request_timeout = match env::var("API_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: "API_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "API_TIMEOUT_SECS",
                        value: raw,
                    });
                }
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let token_file = env::var("LAUNDRY_ADMIN_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_token_file());

        Ok(Self {
            api_url,
            request_timeout,
            token_file,
        })
    }
}

fn default_token_file() -> PathBuf {
    let base = env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    base.join(".laundry-admin").join("token")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
