//! Error taxonomy for an analysis run.
//!
//! Collaborator errors ([`SourceError`], [`LlmError`]) are converted into the
//! failing stage's [`AnalysisError`] variant. Every variant aborts the run and
//! carries a stable [`ErrorKind`] so callers can branch without parsing
//! messages.

use serde::Serialize;

/// Machine-readable discriminator for [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    SourceUnavailable,
    NoPapers,
    ExtractionFailed,
    NarrationFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::SourceUnavailable => "source_unavailable",
            Self::NoPapers => "no_papers",
            Self::ExtractionFailed => "extraction_failed",
            Self::NarrationFailed => "narration_failed",
        }
    }

    /// HTTP status code used at the request boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::NoPapers => 404,
            Self::SourceUnavailable => 502,
            Self::ExtractionFailed | Self::NarrationFailed => 503,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of an analysis run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("paper source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    #[error("no papers found for topic '{topic}'")]
    NoPapers { topic: String },

    #[error("keyword extraction failed: {0}")]
    ExtractionFailed(#[source] LlmError),

    #[error("narration failed ({section}): {source}")]
    NarrationFailed {
        section: &'static str,
        #[source]
        source: LlmError,
    },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::SourceUnavailable(_) => ErrorKind::SourceUnavailable,
            Self::NoPapers { .. } => ErrorKind::NoPapers,
            Self::ExtractionFailed(_) => ErrorKind::ExtractionFailed,
            Self::NarrationFailed { .. } => ErrorKind::NarrationFailed,
        }
    }
}

/// Errors from the paper source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("source returned status {status}")]
    Status { status: u16 },

    #[error("malformed response: {0}")]
    Parse(String),
}

/// Errors from the text-completion service.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {message}")]
    Request { message: String },

    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("could not decode response: {message}")]
    Decode { message: String },
}

/// Errors while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error("could not build {client} client: {message}")]
    Client {
        client: &'static str,
        message: String,
    },
}
