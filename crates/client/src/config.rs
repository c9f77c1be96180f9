//! Client configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Default backend base URL for local development.
const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Read `var` and parse it, falling back to `default` when unset or empty.
pub fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

/// Read an optional variable; unset and empty both mean `None`.
pub fn env_opt<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::Invalid {
                    var,
                    reason: e.to_string(),
                })
        }
        _ => Ok(None),
    }
}

/// Connection settings for [`ReelApi`](crate::api::ReelApi).
///
/// | Env Var                        | Default                     |
/// |--------------------------------|-----------------------------|
/// | `REELGEN_API_URL`              | `http://localhost:8000/api` |
/// | `REELGEN_ACCESS_TOKEN`         | unset                       |
/// | `REELGEN_REQUEST_TIMEOUT_SECS` | `30`                        |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without a trailing slash.
    pub api_url: String,
    /// Bearer token supplied by the auth collaborator.
    pub access_token: Option<String>,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url: String = env_or("REELGEN_API_URL", DEFAULT_API_URL.to_string())?;
        let access_token: Option<String> = env_opt("REELGEN_ACCESS_TOKEN")?;
        let timeout_secs: u64 =
            env_or("REELGEN_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        let mut config = Self::new(api_url);
        config.access_token = access_token;
        config.request_timeout = Duration::from_secs(timeout_secs);
        Ok(config)
    }
}
