/// Error types for FolioView
///
/// The view engine itself has exactly one checked failure, `InvalidArgument`.
/// The remaining variants belong to the collaborators around it (export,
/// record decoding, fetch/mutation, configuration).
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("CSV export error: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ViewError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ViewError::InvalidArgument(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ViewError::InvalidArgument(_))
    }
}

/// Failures reported by fetch and mutation collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<ViewError> for SourceError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::InvalidArgument(message) => SourceError::InvalidArgument(message),
            other => SourceError::Request(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::MalformedPayload(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}
