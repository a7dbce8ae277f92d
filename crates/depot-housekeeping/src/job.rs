//! Job trait shared by the scheduler

use crate::error::HousekeepingError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Job that ran
    pub job: &'static str,
    /// Records written or entries removed
    pub affected: usize,
    /// Where the output went, if anywhere
    pub location: Option<String>,
}

impl JobReport {
    /// Create report
    #[inline]
    #[must_use]
    pub fn new(job: &'static str, affected: usize) -> Self {
        Self {
            job,
            affected,
            location: None,
        }
    }

    /// With output location
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Periodic batch task against the store
#[async_trait]
pub trait HousekeepingJob: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Run once as of `now`
    async fn run_once(&self, now: DateTime<Utc>) -> Result<JobReport, HousekeepingError>;
}
