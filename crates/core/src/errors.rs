use thiserror::Error;

/// Message shown when a mutation fails and the server gave no detail.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Unified error type for the entire budget-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local validation ────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    // ── Session / Authorization ─────────────────────────────────────
    #[error("Not authorized: {0}")]
    Auth(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // ── API / Network ───────────────────────────────────────────────
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Another change is still being saved")]
    Busy,

    // ── Storage / Config ────────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// True for 401/403-equivalent responses; these end the session.
    pub fn is_auth(&self) -> bool {
        matches!(self, CoreError::Auth(_))
    }

    /// True when an update/delete target no longer exists on the server.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }

    /// True for failures detected locally, before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }

    /// The text a user should see for a failed remote operation: the
    /// server-provided detail when there is one, otherwise [`GENERIC_FAILURE`].
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Validation(msg) => msg.clone(),
            CoreError::InvalidCredentials => "Invalid credentials".to_string(),
            CoreError::Busy => self.to_string(),
            CoreError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            CoreError::NotFound(detail) | CoreError::Fetch(detail) | CoreError::Auth(detail)
                if !detail.is_empty() =>
            {
                detail.clone()
            }
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; query strings hold year/month
        // filters and are noise in user-facing text.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        if e.is_decode() {
            CoreError::Deserialization(sanitized)
        } else {
            CoreError::Network(sanitized)
        }
    }
}
