//! Activity-log pruning by age

use crate::error::HousekeepingError;
use crate::job::{HousekeepingJob, JobReport};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use depot_store::ActivityLog;
use std::sync::Arc;
use tracing::info;

/// Drops activity entries older than the retention window
pub struct LogRetentionJob {
    log: Arc<dyn ActivityLog>,
    retention: Duration,
}

impl LogRetentionJob {
    /// Create job keeping `retention` worth of entries
    #[must_use]
    pub fn new(log: Arc<dyn ActivityLog>, retention: Duration) -> Self {
        Self { log, retention }
    }

    /// Oldest timestamp that survives a run at `now`
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.retention
    }
}

impl std::fmt::Debug for LogRetentionJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRetentionJob")
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HousekeepingJob for LogRetentionJob {
    fn name(&self) -> &'static str {
        "log-retention"
    }

    async fn run_once(&self, now: DateTime<Utc>) -> Result<JobReport, HousekeepingError> {
        let cutoff = self.cutoff(now);
        let removed = self.log.prune_before(cutoff).await?;
        info!(%cutoff, removed, "activity log pruned");
        Ok(JobReport::new(self.name(), removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_store::{MockActivityLog, StoreError};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[tokio::test]
    async fn prunes_with_cutoff() {
        let mut log = MockActivityLog::new();
        log.expect_prune_before()
            .withf(|cutoff| *cutoff == at("2026-02-01T00:00:00Z"))
            .times(1)
            .returning(|_| Ok(4));

        let job = LogRetentionJob::new(Arc::new(log), Duration::days(28));
        let report = job.run_once(at("2026-03-01T00:00:00Z")).await.unwrap();
        assert_eq!(report, JobReport::new("log-retention", 4));
    }

    #[tokio::test]
    async fn store_failure_surfaces() {
        let mut log = MockActivityLog::new();
        log.expect_prune_before()
            .returning(|_| Err(StoreError::Network("timeout".into())));

        let job = LogRetentionJob::new(Arc::new(log), Duration::days(30));
        let err = job.run_once(Utc::now()).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
