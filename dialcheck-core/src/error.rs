//! Error types for dialcheck operations

/// Result type for dialcheck operations
pub type Result<T> = std::result::Result<T, DialcheckError>;

/// Error types for the scenario harness
#[derive(Debug, thiserror::Error)]
pub enum DialcheckError {
    /// Configuration error (missing credential, invalid value)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed scenario input
    #[error("Scenario error: {0}")]
    Scenario(String),

    /// Invalid outcome catalog
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Backend answered with a non-success status
    #[error("LLM backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Request could not be sent or the response could not be read
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend call exceeded the configured per-call timeout
    #[error("LLM backend call timed out after {0}ms")]
    Timeout(u64),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DialcheckError {
    /// Whether this error aborts a whole run rather than a single scenario.
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            DialcheckError::Configuration(_)
                | DialcheckError::Scenario(_)
                | DialcheckError::Catalog(_)
        )
    }
}

impl From<String> for DialcheckError {
    fn from(s: String) -> Self {
        DialcheckError::Other(s)
    }
}

impl From<&str> for DialcheckError {
    fn from(s: &str) -> Self {
        DialcheckError::Other(s.to_string())
    }
}

impl From<figment::Error> for DialcheckError {
    fn from(err: figment::Error) -> Self {
        DialcheckError::Configuration(err.to_string())
    }
}
