//! Error types for housekeeping jobs

use depot_store::StoreError;
use std::path::PathBuf;

/// Housekeeping job error
#[derive(Debug, thiserror::Error)]
pub enum HousekeepingError {
    /// Store or activity log call failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Backup directory I/O failed
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Backup document could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HousekeepingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the next scheduled run may succeed unchanged
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            Self::Io { .. } => true,
            Self::Serialization(_) => false,
        }
    }
}
