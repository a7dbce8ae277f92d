//! Service configuration
//!
//! Loaded from one TOML file; every section and key is optional.
//!
//! ```toml
//! collection = "depots"
//! excluded_names = ["admin"]
//! log_filter = "info,depot_session=debug"
//! json_logs = false
//!
//! [auth]
//! employee_session_ttl_secs = 43200
//! admin_password_sha256 = "..."
//!
//! [housekeeping]
//! backup_dir = "/var/lib/depots/backups"
//! keep_backups = 7
//! ```

use crate::error::TrackerError;
use depot_housekeeping::HousekeepingConfig;
use depot_session::AuthConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Store collection holding the depots
    pub collection: String,
    /// Names hidden from the depot list
    pub excluded_names: Vec<String>,
    /// `tracing` filter directive; `RUST_LOG` takes precedence
    pub log_filter: String,
    /// Emit JSON log lines
    pub json_logs: bool,
    /// Access gates
    pub auth: AuthConfig,
    /// Backup and retention jobs
    pub housekeeping: HousekeepingConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            collection: "depots".to_string(),
            excluded_names: vec!["admin".to_string()],
            log_filter: "info".to_string(),
            json_logs: false,
            auth: AuthConfig::default(),
            housekeeping: HousekeepingConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Parse from TOML text
    ///
    /// # Errors
    /// [`TrackerError::Config`] on malformed TOML or wrong value types
    pub fn from_toml(text: &str) -> Result<Self, TrackerError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - [`TrackerError::Io`] if the file cannot be read
    /// - [`TrackerError::Config`] if it does not parse
    pub fn load(path: &Path) -> Result<Self, TrackerError> {
        let text = std::fs::read_to_string(path).map_err(|e| TrackerError::io(path, e))?;
        Self::from_toml(&text)
    }

    /// Replace the excluded names, e.g. from repeated `--exclude` flags
    #[must_use]
    pub fn with_excluded_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Excluded names as borrowed slices
    #[must_use]
    pub fn excluded(&self) -> Vec<&str> {
        self.excluded_names.iter().map(String::as_str).collect()
    }
}
