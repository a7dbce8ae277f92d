//! Housekeeping configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DAY_SECS: u64 = 24 * 60 * 60;

/// Schedules and limits for the backup and retention jobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HousekeepingConfig {
    /// Seconds between backups
    pub backup_interval_secs: u64,
    /// Where backup files go
    pub backup_dir: PathBuf,
    /// Backups kept after each run, newest first
    pub keep_backups: usize,
    /// Activity entries older than this many days are pruned
    pub log_retention_days: u32,
    /// Seconds between prune runs
    pub prune_interval_secs: u64,
}

impl Default for HousekeepingConfig {
    fn default() -> Self {
        Self {
            backup_interval_secs: DAY_SECS,
            backup_dir: PathBuf::from("backups"),
            keep_backups: 7,
            log_retention_days: 30,
            prune_interval_secs: DAY_SECS,
        }
    }
}

impl HousekeepingConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With backup directory
    #[inline]
    #[must_use]
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// With number of backups to keep
    #[inline]
    #[must_use]
    pub fn with_keep_backups(mut self, keep: usize) -> Self {
        self.keep_backups = keep;
        self
    }

    /// With activity-log retention in days
    #[inline]
    #[must_use]
    pub fn with_log_retention_days(mut self, days: u32) -> Self {
        self.log_retention_days = days;
        self
    }

    /// Backup period; never shorter than one second
    #[must_use]
    pub fn backup_interval(&self) -> Duration {
        Duration::from_secs(self.backup_interval_secs.max(1))
    }

    /// Prune period; never shorter than one second
    #[must_use]
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs.max(1))
    }

    /// Retention window for activity entries
    #[must_use]
    pub fn log_retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.log_retention_days))
    }
}
