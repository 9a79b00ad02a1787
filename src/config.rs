//! Client configuration parsed from environment variables.
//!
//! The API base URL, application name and version are the three values the
//! deployment bakes in; the remaining knobs are local to this client.

use std::path::PathBuf;
use std::time::Duration;

use crate::api::endpoints::API_PREFIX;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_APP_NAME: &str = "NutriZulia";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STORE_PATH: &str = ".nutrizulia/session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API_URL `{value}`: {reason}")]
    InvalidApiUrl { value: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API origin without trailing slash, e.g. `http://localhost:8080`.
    pub api_url: String,
    pub app_name: String,
    pub version: String,
    /// Sign in through `/auth/sign-in-admin` instead of `/auth/sign-in`.
    pub admin_login: bool,
    pub timeouts: Timeouts,
    pub store_path: PathBuf,
}

impl ClientConfig {
    /// Build a config for the given API origin with every other field at its default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if `api_url` is not an absolute http(s) URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            app_name: DEFAULT_APP_NAME.to_owned(),
            version: DEFAULT_VERSION.to_owned(),
            admin_login: false,
            timeouts: Timeouts::default(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `API_URL`: default `http://localhost:8080`
    /// - `APP_NAME`: default `NutriZulia`
    /// - `VERSION`: default `1.0.0`
    /// - `NUTRIZULIA_ADMIN_LOGIN`: `true`/`false`, default false
    /// - `NUTRIZULIA_REQUEST_TIMEOUT_SECS`: default 30
    /// - `NUTRIZULIA_CONNECT_TIMEOUT_SECS`: default 10
    /// - `NUTRIZULIA_STORE_PATH`: default `.nutrizulia/session.json`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] when `API_URL` does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(&env_or("API_URL", DEFAULT_API_URL))?;
        let timeouts = Timeouts {
            request_secs: env_parse_u64("NUTRIZULIA_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("NUTRIZULIA_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url,
            app_name: env_or("APP_NAME", DEFAULT_APP_NAME),
            version: env_or("VERSION", DEFAULT_VERSION),
            admin_login: env_bool("NUTRIZULIA_ADMIN_LOGIN").unwrap_or(false),
            timeouts,
            store_path: PathBuf::from(env_or("NUTRIZULIA_STORE_PATH", DEFAULT_STORE_PATH)),
        })
    }

    /// Point the config at another API origin.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if `api_url` is not an absolute http(s) URL.
    pub fn set_api_url(&mut self, api_url: &str) -> Result<(), ConfigError> {
        self.api_url = normalize_api_url(api_url)?;
        Ok(())
    }

    /// Full URL for a relative endpoint: `{api_url}/api/v1{endpoint}`.
    #[must_use]
    pub fn api_url_for(&self, endpoint: &str) -> String {
        format!("{}{API_PREFIX}{endpoint}", self.api_url)
    }

    /// Full URL for an endpoint template after substituting `:name` params.
    ///
    /// No endpoint the session core calls takes params; this serves the
    /// parameterized user and catalog routes.
    #[must_use]
    pub fn api_url_with_params(&self, endpoint: &str, params: &[(&str, &str)]) -> String {
        self.api_url_for(&replace_params(endpoint, params))
    }
}

/// Replace `:key` placeholders in an endpoint template.
#[must_use]
pub fn replace_params(endpoint: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(endpoint.to_owned(), |acc, (key, value)| acc.replacen(&format!(":{key}"), value, 1))
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidApiUrl { value: raw.to_owned(), reason: e.to_string() })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidApiUrl {
            value: raw.to_owned(),
            reason: format!("unsupported scheme `{}`", parsed.scheme()),
        });
    }
    Ok(trimmed.to_owned())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
