//! Configuration management for the rt-mcp server.
//!
//! This module handles loading configuration from environment variables,
//! with validation to ensure all required values are present.

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::RtError;

/// Default timeout for every RT API call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Configuration for connecting to Request Tracker.
///
/// The token is stored but never logged or exposed in error messages.
#[derive(Clone)]
pub struct Config {
    /// Base URL for the RT instance (e.g., `https://rt.example.com/REST/2.0`).
    pub base_url: String,

    /// RT auth token, sent as `Authorization: token <value>`.
    /// This value must never be logged or included in error messages.
    pub token: String,

    /// Upper bound for every request made to RT.
    pub timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `RT_BASE_URL`: The base URL of the RT instance
    /// - `RT_TOKEN`: An RT auth token
    ///
    /// # Optional Environment Variables
    ///
    /// - `RT_TIMEOUT_SECS`: Request timeout in seconds (default: 20)
    ///
    /// # Errors
    ///
    /// Returns `RtError::Config` if any required variable is missing
    /// or if values fail validation.
    pub fn from_env() -> Result<Self, RtError> {
        let base_url = Self::get_required_env("RT_BASE_URL")?;
        let token = Self::get_required_env("RT_TOKEN")?;

        let base_url = Self::validate_base_url(base_url)?;
        Self::validate_token(&token)?;

        let timeout = match env::var("RT_TIMEOUT_SECS") {
            Ok(raw) => Self::parse_timeout(&raw)?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Config {
            base_url,
            token,
            timeout,
        })
    }

    /// Returns the auth token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, RtError> {
        env::var(name)
            .map_err(|_| RtError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(RtError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }

    /// Validates and normalizes the base URL.
    fn validate_base_url(url: String) -> Result<String, RtError> {
        let url = url.trim().trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RtError::invalid_config(
                "RT_BASE_URL must start with http:// or https://",
            ));
        }

        let parsed = Url::parse(&url)
            .map_err(|e| RtError::invalid_config(format!("RT_BASE_URL is not a valid URL: {}", e)))?;
        if parsed.host().is_none() {
            return Err(RtError::invalid_config("RT_BASE_URL must include a host"));
        }

        Ok(url)
    }

    /// Validates the token is not a placeholder value.
    fn validate_token(token: &str) -> Result<(), RtError> {
        let token_lower = token.to_lowercase();
        let placeholder_patterns = ["your_token", "your-token", "placeholder", "xxx", "changeme"];

        for pattern in placeholder_patterns {
            if token_lower.contains(pattern) {
                return Err(RtError::invalid_config(
                    "RT_TOKEN appears to be a placeholder value",
                ));
            }
        }

        Ok(())
    }

    fn parse_timeout(raw: &str) -> Result<Duration, RtError> {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(RtError::invalid_config(
                "RT_TIMEOUT_SECS must be a positive number of seconds",
            )),
        }
    }
}
