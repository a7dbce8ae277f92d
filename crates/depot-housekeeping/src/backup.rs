//! Periodic backup copy of the depot collection
//!
//! Each run reads the whole collection through [`DepotStore::snapshot`] and
//! hands it to a [`BackupSink`]. [`JsonDirectorySink`] writes one
//! `depots-<UTC timestamp>.json` file per run and keeps the newest N.

use crate::error::HousekeepingError;
use crate::job::{HousekeepingJob, JobReport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use depot_model::{DepotId, RawRecord};
use depot_store::DepotStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const FILE_PREFIX: &str = "depots-";
const FILE_SUFFIX: &str = ".json";

/// One backup copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    /// When the snapshot was read
    pub taken_at: DateTime<Utc>,
    /// Source collection
    pub collection: String,
    /// Raw documents keyed by id
    pub depots: BTreeMap<DepotId, Map<String, Value>>,
}

impl BackupDocument {
    /// Build from a store snapshot
    #[must_use]
    pub fn from_records(
        taken_at: DateTime<Utc>,
        collection: impl Into<String>,
        records: Vec<RawRecord>,
    ) -> Self {
        Self {
            taken_at,
            collection: collection.into(),
            depots: records.into_iter().map(|r| (r.id, r.fields)).collect(),
        }
    }

    /// Back to raw records, in id order
    #[must_use]
    pub fn into_records(self) -> Vec<RawRecord> {
        self.depots
            .into_iter()
            .map(|(id, fields)| RawRecord::new(id, fields))
            .collect()
    }
}

/// Destination for backup copies
#[async_trait]
pub trait BackupSink: Send + Sync {
    /// Persist `document`; returns where it went
    async fn write(&self, document: &BackupDocument) -> Result<String, HousekeepingError>;
}

/// Backup files in one directory
#[derive(Debug, Clone)]
pub struct JsonDirectorySink {
    dir: PathBuf,
    keep: usize,
}

impl JsonDirectorySink {
    /// Write into `dir`, keeping the newest `keep` files (at least one)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, keep: usize) -> Self {
        Self {
            dir: dir.into(),
            keep: keep.max(1),
        }
    }

    /// Backup directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a backup taken at `at`
    #[must_use]
    pub fn file_name(at: DateTime<Utc>) -> String {
        format!("{FILE_PREFIX}{}{FILE_SUFFIX}", at.format("%Y%m%dT%H%M%S%.3fZ"))
    }

    /// Backup files currently in the directory, newest first
    ///
    /// # Errors
    /// [`HousekeepingError::Io`] if the directory cannot be listed
    pub async fn backups(&self) -> Result<Vec<PathBuf>, HousekeepingError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(HousekeepingError::io(&self.dir, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| HousekeepingError::io(&self.dir, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX) {
                names.push(name);
            }
        }
        // Timestamps are fixed-width, so name order is time order.
        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names.into_iter().map(|n| self.dir.join(n)).collect())
    }

    async fn prune(&self) -> Result<usize, HousekeepingError> {
        let stale: Vec<PathBuf> = self.backups().await?.into_iter().skip(self.keep).collect();
        for path in &stale {
            tokio::fs::remove_file(path)
                .await
                .map_err(|e| HousekeepingError::io(path, e))?;
            debug!(path = %path.display(), "old backup removed");
        }
        Ok(stale.len())
    }
}

#[async_trait]
impl BackupSink for JsonDirectorySink {
    async fn write(&self, document: &BackupDocument) -> Result<String, HousekeepingError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| HousekeepingError::io(&self.dir, e))?;

        let path = self.dir.join(Self::file_name(document.taken_at));
        let body = serde_json::to_vec_pretty(document)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| HousekeepingError::io(&path, e))?;

        let removed = self.prune().await?;
        debug!(path = %path.display(), removed, "backup written");
        Ok(path.display().to_string())
    }
}

/// Read a backup file written by [`JsonDirectorySink`]
///
/// # Errors
/// - [`HousekeepingError::Io`] if the file cannot be read
/// - [`HousekeepingError::Serialization`] if it is not a backup document
pub async fn read_backup(path: &Path) -> Result<BackupDocument, HousekeepingError> {
    let body = tokio::fs::read(path)
        .await
        .map_err(|e| HousekeepingError::io(path, e))?;
    Ok(serde_json::from_slice(&body)?)
}

/// Copies the depot collection to a sink
pub struct BackupJob {
    store: Arc<dyn DepotStore>,
    sink: Arc<dyn BackupSink>,
    collection: String,
}

impl BackupJob {
    /// Create job
    #[must_use]
    pub fn new(
        store: Arc<dyn DepotStore>,
        sink: Arc<dyn BackupSink>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            sink,
            collection: collection.into(),
        }
    }
}

impl std::fmt::Debug for BackupJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupJob")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HousekeepingJob for BackupJob {
    fn name(&self) -> &'static str {
        "backup"
    }

    async fn run_once(&self, now: DateTime<Utc>) -> Result<JobReport, HousekeepingError> {
        let records = self.store.snapshot().await?;
        let document = BackupDocument::from_records(now, &self.collection, records);
        let count = document.depots.len();
        let location = self.sink.write(&document).await?;
        info!(collection = %self.collection, depots = count, location = %location, "backup complete");
        Ok(JobReport::new(self.name(), count).with_location(location))
    }
}
