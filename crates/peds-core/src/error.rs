use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Unrecognized style category/variant or an unusable setting.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Search engine or embedding service unreachable, timed out, or answered garbage.
    #[error("Upstream unavailable ({service}): {message}")]
    UpstreamUnavailable { service: &'static str, message: String },

    /// Generation call failed or produced no text.
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Example corpus unavailable: {0}")]
    CorpusUnavailable(String),

    /// Caller contract violation in a pure component.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl Error {
    pub fn upstream(service: &'static str, message: impl std::fmt::Display) -> Self {
        Error::UpstreamUnavailable { service, message: message.to_string() }
    }

    /// True for failures of external services, the only ones callers may degrade on.
    pub fn is_external(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable { .. } | Error::Generation(_) | Error::CorpusUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
