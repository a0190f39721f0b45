use std::path::PathBuf;
use thiserror::Error;

/// Raised when a single field of a result row cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid race time: '{0}'")]
    InvalidTime(String),

    #[error("Invalid run date: '{0}' (expected DD/MM/YYYY)")]
    InvalidDate(String),

    #[error("Invalid {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to persist {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_persist_failure(&self) -> bool {
        matches!(self, StorageError::Persist { .. })
    }
}
