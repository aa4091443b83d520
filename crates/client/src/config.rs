use std::path::PathBuf;
use std::time::Duration;

use crate::workflow::{PollConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};

/// Default backend API root.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend API root, without a trailing slash.
    pub api_base_url: String,
    pub poll: PollConfig,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Directory holding the persisted session entries.
    pub session_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                           |
    /// |-------------------------------|-----------------------------------|
    /// | `VIDGEN_API_BASE_URL`         | `http://localhost:8000/api/v1`    |
    /// | `VIDGEN_POLL_INTERVAL_SECS`   | `10`                              |
    /// | `VIDGEN_POLL_MAX_ATTEMPTS`    | `60`                              |
    /// | `VIDGEN_REQUEST_TIMEOUT_SECS` | `30`                              |
    /// | `VIDGEN_SESSION_DIR`          | `<platform data dir>/vidgen`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("VIDGEN_API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let interval_secs: u64 = parse_var(
            &lookup,
            "VIDGEN_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL.as_secs(),
        )?;
        let max_attempts: u32 =
            parse_var(&lookup, "VIDGEN_POLL_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "VIDGEN_POLL_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        let request_timeout_secs: u64 = parse_var(
            &lookup,
            "VIDGEN_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        let session_dir = lookup("VIDGEN_SESSION_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_session_dir);

        Ok(Self {
            api_base_url,
            poll: PollConfig {
                interval: Duration::from_secs(interval_secs),
                max_attempts,
            },
            request_timeout_secs,
            session_dir,
        })
    }

    /// HTTP client with the configured request timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()?)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn default_session_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("vidgen")
}
