/// Shared error type used across all Synapse crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    /// Startup misconfiguration. Never recoverable at request time.
    #[error("config: {0}")]
    Config(String),

    /// The integration for a provider could not be acquired (not compiled in,
    /// client construction failed). Fatal at startup like [`Error::Config`],
    /// but kept apart so logs tell the two failure modes apart.
    #[error("backend {provider} unavailable: {message}")]
    BackendUnavailable { provider: String, message: String },

    /// A client-caused request problem (HTTP 400).
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error was caused by the caller rather than the backend.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
