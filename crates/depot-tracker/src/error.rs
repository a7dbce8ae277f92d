//! Service-level errors

use std::path::{Path, PathBuf};

/// Error loading configuration or seed data
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file did not parse
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Seed file did not parse
    #[error("invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),

    /// Seed file parsed but is not an object of documents
    #[error("seed data must be an object keyed by depot id")]
    SeedShape,

    /// Log subscriber could not be installed
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl TrackerError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
