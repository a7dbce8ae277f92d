//! Interval scheduler
//!
//! Each job runs on its own `tokio::time::interval` task. The first tick
//! fires immediately, so every job runs once at startup. A failed run is
//! logged and the loop waits for the next tick.

use crate::job::HousekeepingJob;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Owns the running job tasks
#[derive(Debug)]
pub struct Scheduler {
    stop: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create scheduler with no jobs
    #[must_use]
    pub fn new() -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            stop,
            tasks: Vec::new(),
        }
    }

    /// Number of running jobs
    #[inline]
    #[must_use]
    pub fn job_count(&self) -> usize {
        self.tasks.len()
    }

    /// Start running `job` every `period`
    pub fn spawn(&mut self, job: Arc<dyn HousekeepingJob>, period: Duration) {
        let name = job.name();
        let mut stop = self.stop.subscribe();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = stop.changed() => break,
                    _ = interval.tick() => {}
                }
                match job.run_once(Utc::now()).await {
                    Ok(report) => debug!(job = name, affected = report.affected, "job finished"),
                    Err(e) if e.is_retryable() => warn!(job = name, error = %e, "job failed; retrying next tick"),
                    Err(e) => error!(job = name, error = %e, "job failed"),
                }
            }
            debug!(job = name, "job stopped");
        });
        info!(job = name, period_secs = period.as_secs(), "job scheduled");
        self.tasks.push((name, task));
    }

    /// Stop every job and wait for in-flight runs to finish
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        for (name, task) in self.tasks {
            if let Err(e) = task.await {
                error!(job = name, error = %e, "job task panicked");
            }
        }
        info!("housekeeping stopped");
    }
}
