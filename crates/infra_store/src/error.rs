//! Storage error types

use std::path::PathBuf;
use thiserror::Error;

use core_kernel::PortError;

/// Errors raised by the storage adapters
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key cannot be mapped to a file name
    #[error("Invalid storage key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// The storage directory is missing and may not be created
    #[error("Storage directory {0} does not exist")]
    MissingDirectory(PathBuf),

    /// Reading, writing or renaming a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored file is not valid UTF-8
    #[error("Stored value at {0} is not valid UTF-8")]
    InvalidUtf8(PathBuf),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Checks if this error comes from the filesystem rather than the caller
    pub fn is_io(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::MissingDirectory(_))
    }
}

impl From<StoreError> for PortError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::InvalidKey { .. } => PortError::validation(error.to_string()),
            StoreError::InvalidUtf8(_) => PortError::transformation(error.to_string()),
            StoreError::MissingDirectory(_) => PortError::internal(error.to_string()),
            StoreError::Io { .. } => PortError::Internal {
                message: "storage I/O failed".to_string(),
                source: Some(Box::new(error)),
            },
        }
    }
}
