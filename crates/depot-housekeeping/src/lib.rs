//! Depot Housekeeping
//!
//! Periodic batch jobs against the depot store, independent of any edit
//! session:
//! - Backup copy of the whole collection to JSON files
//! - Activity-log pruning by age
//!
//! Both run under a [`Scheduler`] on fixed intervals.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backup;
pub mod config;
pub mod error;
pub mod job;
pub mod retention;
pub mod scheduler;

pub use backup::{read_backup, BackupDocument, BackupJob, BackupSink, JsonDirectorySink};
pub use config::HousekeepingConfig;
pub use error::HousekeepingError;
pub use job::{HousekeepingJob, JobReport};
pub use retention::LogRetentionJob;
pub use scheduler::Scheduler;

use depot_store::{ActivityLog, DepotStore};
use std::sync::Arc;

/// Start the backup and retention jobs described by `config`
#[must_use]
pub fn start(
    config: &HousekeepingConfig,
    store: Arc<dyn DepotStore>,
    log: Arc<dyn ActivityLog>,
    collection: &str,
) -> Scheduler {
    let sink = Arc::new(JsonDirectorySink::new(
        config.backup_dir.clone(),
        config.keep_backups,
    ));
    let mut scheduler = Scheduler::new();
    scheduler.spawn(
        Arc::new(BackupJob::new(store, sink, collection)),
        config.backup_interval(),
    );
    scheduler.spawn(
        Arc::new(LogRetentionJob::new(log, config.log_retention())),
        config.prune_interval(),
    );
    scheduler
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
