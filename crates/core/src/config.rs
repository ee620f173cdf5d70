use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// API base URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Per-request timeout used when nothing is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "BUDGET_API_URL";
pub const ENV_SESSION_PATH: &str = "BUDGET_SESSION_PATH";
pub const ENV_TIMEOUT_SECS: &str = "BUDGET_REQUEST_TIMEOUT_SECS";

const SESSION_FILE_NAME: &str = "session.btkv";

/// Deployment configuration for the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the budget API, without a trailing slash.
    pub api_url: String,

    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,

    /// Where the persisted session (token + username) lives.
    pub session_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_path: default_session_path(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `BUDGET_API_URL`, `BUDGET_SESSION_PATH` and
    /// `BUDGET_REQUEST_TIMEOUT_SECS`, then validated.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(path) = lookup(ENV_SESSION_PATH) {
            config.session_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                CoreError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{secs}'"))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validated()
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = path.into();
        self
    }

    /// Check invariants and normalize the base URL.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        let url = self.api_url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(CoreError::Config("API URL must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "API URL must start with http:// or https://, got '{url}'"
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(CoreError::Config("Request timeout must be greater than zero".into()));
        }
        self.api_url = url;
        Ok(self)
    }
}

/// Platform data directory, or the working directory if none can be determined.
fn default_session_path() -> PathBuf {
    ProjectDirs::from("com", "BudgetTracker", "budget-tracker")
        .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(SESSION_FILE_NAME))
}
