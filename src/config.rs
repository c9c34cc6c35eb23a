//! Configuration management for Hikmah
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the answer service (no trailing slash needed)
    pub api_url: String,
    /// User identifier sent with every chat request
    pub user_id: String,
    /// Opaque bearer token obtained by the host application
    pub auth_token: String,

    /// Timeout applied to each HTTP request (in seconds)
    pub request_timeout_seconds: u64,
    /// Upper bound on prior messages sent with each turn
    pub max_history_messages: usize,

    /// Verbose logging by default
    pub debug_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_url: env::var("HIKMAH_API_URL")
                .context("HIKMAH_API_URL must be set")?
                .trim_end_matches('/')
                .to_string(),
            user_id: env::var("HIKMAH_USER_ID").context("HIKMAH_USER_ID must be set")?,
            auth_token: env::var("HIKMAH_AUTH_TOKEN").context("HIKMAH_AUTH_TOKEN must be set")?,

            request_timeout_seconds: env::var("HIKMAH_REQUEST_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .context("Invalid HIKMAH_REQUEST_TIMEOUT_SECONDS")?,
            max_history_messages: env::var("HIKMAH_MAX_HISTORY")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("Invalid HIKMAH_MAX_HISTORY")?,

            debug_enabled: env::var("HIKMAH_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// Build a configuration pointing at an explicit server, with defaults
    pub fn new(api_url: &str, user_id: &str, auth_token: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
            auth_token: auth_token.to_string(),
            request_timeout_seconds: 120,
            max_history_messages: 20,
            debug_enabled: false,
        }
    }
}
