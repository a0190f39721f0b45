use serde::Serialize;
use storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImporterError>;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Fetch task aborted: {0}")]
    FetchAborted(String),

    #[error("Failed to parse results page: {0}")]
    Parse(String),

    #[error("Athlete name mismatch: expected '{expected}', found '{found}'")]
    IdentityMismatch { expected: String, found: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// The per-athlete failures an ingestion run records and moves past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    Parse,
    IdentityMismatch,
}

impl ImporterError {
    /// `None` for errors that must abort the run instead.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Fetch(_) | Self::FetchAborted(_) => Some(FailureKind::Fetch),
            Self::Parse(_) => Some(FailureKind::Parse),
            Self::IdentityMismatch { .. } => Some(FailureKind::IdentityMismatch),
            Self::Storage(_) | Self::Config(_) => None,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Parse => "parse",
            Self::IdentityMismatch => "identity mismatch",
        };
        f.write_str(name)
    }
}
