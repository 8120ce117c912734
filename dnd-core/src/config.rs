//! Client configuration from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DND_API_URL` | `http://localhost:8000` |
//! | `DND_REQUEST_TIMEOUT_SECS` | 30 |
//! | `DND_SAVE_TIMEOUT_SECS` | 15 |
//! | `DND_SESSION_CHECK_SECS` | 300 |
//!
//! A `.env` file in the working directory is loaded first if present.

use dnd_api::{Client, TokenSource};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SAVE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_SESSION_CHECK: Duration = Duration::from_secs(300);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Upper bound on a character save, including retries by the server.
    pub save_timeout: Duration,
    /// How often the session is re-validated while signed in.
    pub session_check_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            save_timeout: DEFAULT_SAVE_TIMEOUT,
            session_check_interval: DEFAULT_SESSION_CHECK,
        }
    }
}

impl ClientConfig {
    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let api_url = lookup("DND_API_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);

        Ok(Self {
            api_url,
            request_timeout: seconds(&lookup, "DND_REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,
            save_timeout: seconds(&lookup, "DND_SAVE_TIMEOUT_SECS", defaults.save_timeout)?,
            session_check_interval: seconds(
                &lookup,
                "DND_SESSION_CHECK_SECS",
                defaults.session_check_interval,
            )?,
        })
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_save_timeout(mut self, timeout: Duration) -> Self {
        self.save_timeout = timeout;
        self
    }

    pub fn with_session_check_interval(mut self, interval: Duration) -> Self {
        self.session_check_interval = interval;
        self
    }

    /// Build an API client, optionally authenticated by `tokens`.
    pub fn client(&self, tokens: Option<Arc<dyn TokenSource>>) -> Result<Client, dnd_api::Error> {
        let client = Client::new(&self.api_url)?.with_timeout(self.request_timeout);
        Ok(match tokens {
            Some(tokens) => client.with_token_source(tokens),
            None => client,
        })
    }
}

fn seconds<F>(lookup: &F, var: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid { var, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.save_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("DND_API_URL", " https://api.example.com/ "),
            ("DND_REQUEST_TIMEOUT_SECS", "5"),
            ("DND_SAVE_TIMEOUT_SECS", "20"),
            ("DND_SESSION_CHECK_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.com/");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.save_timeout, Duration::from_secs(20));
        assert_eq!(config.session_check_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_values() {
        let err = ClientConfig::from_lookup(lookup(&[("DND_SAVE_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "DND_SAVE_TIMEOUT_SECS",
                value: "soon".to_string()
            }
        );
        assert!(ClientConfig::from_lookup(lookup(&[("DND_SESSION_CHECK_SECS", "0")])).is_err());
    }

    #[test]
    fn test_blank_url_uses_default() {
        let config = ClientConfig::from_lookup(lookup(&[("DND_API_URL", "  ")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_builder_and_client() {
        let config = ClientConfig::default()
            .with_api_url("http://127.0.0.1:9000/")
            .with_save_timeout(Duration::from_secs(3));
        assert_eq!(config.save_timeout, Duration::from_secs(3));
        let client = config.client(None).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9000");
    }
}
