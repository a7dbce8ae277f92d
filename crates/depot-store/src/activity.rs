//! Activity log port
//!
//! Who did what, for the admin page. Appends are fire-and-forget from the
//! depot model's point of view: see [`record_activity`].

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One logged action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// When it happened
    pub at: DateTime<Utc>,
    /// Employee or admin that acted
    pub actor: String,
    /// Human-readable description
    pub message: String,
}

/// Append-only action log with age-based pruning
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append an entry stamped with the current time
    async fn append(&self, actor: &str, message: &str) -> Result<(), StoreError>;

    /// Up to `limit` entries, newest first
    async fn entries(&self, limit: usize) -> Result<Vec<ActivityEntry>, StoreError>;

    /// Drop entries older than `cutoff`; returns how many were removed
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// Append without letting a log failure reach the caller
pub async fn record_activity(log: &dyn ActivityLog, actor: &str, message: &str) {
    if let Err(err) = log.append(actor, message).await {
        warn!(actor, activity = message, error = %err, "activity log append failed");
    }
}

/// In-memory activity log
#[derive(Debug, Default)]
pub struct MemoryActivityLog {
    entries: Mutex<Vec<ActivityEntry>>,
}

impl MemoryActivityLog {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append with an explicit timestamp
    pub fn append_at(&self, at: DateTime<Utc>, actor: impl Into<String>, message: impl Into<String>) {
        let entry = ActivityEntry {
            at,
            actor: actor.into(),
            message: message.into(),
        };
        let mut entries = self.entries.lock();
        // Keep chronological order even for back-dated entries.
        let pos = entries.partition_point(|e| e.at <= entry.at);
        entries.insert(pos, entry);
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ActivityLog for MemoryActivityLog {
    async fn append(&self, actor: &str, message: &str) -> Result<(), StoreError> {
        self.append_at(Utc::now(), actor, message);
        Ok(())
    }

    async fn entries(&self, limit: usize) -> Result<Vec<ActivityEntry>, StoreError> {
        Ok(self.entries.lock().iter().rev().take(limit).cloned().collect())
    }

    async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| e.at >= cutoff);
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn entries_are_newest_first() {
        let log = MemoryActivityLog::new();
        let now = Utc::now();
        log.append_at(now - Duration::hours(2), "ana", "first");
        log.append_at(now, "ana", "third");
        log.append_at(now - Duration::hours(1), "bo", "second");

        let messages: Vec<String> = log
            .entries(10)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["third", "second", "first"]);

        assert_eq!(log.entries(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn prune_removes_only_old_entries() {
        let log = MemoryActivityLog::new();
        let now = Utc::now();
        log.append_at(now - Duration::days(40), "ana", "old");
        log.append_at(now - Duration::days(31), "ana", "older than cutoff");
        log.append_at(now - Duration::days(2), "ana", "recent");

        let removed = log.prune_before(now - Duration::days(30)).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn record_activity_swallows_failures() {
        let mut log = MockActivityLog::new();
        log.expect_append()
            .times(1)
            .returning(|_, _| Err(StoreError::Network("down".into())));

        record_activity(&log, "ana", "deleted depot").await;
    }
}
