//! Shared session handle for the view layer
//!
//! The view layer and the snapshot pump both need the session. The session
//! lock is only held for synchronous steps; store round-trips run without
//! it, so reads and snapshot merges stay live while a write is in flight.
//! A second `commit` or `confirm_delete` while one is outstanding fails
//! fast with [`SessionError::Busy`] instead of queueing.

use crate::error::SessionError;
use crate::session::{CommitReport, EditSession, ReadBack};
use crate::state::SessionPhase;
use depot_model::{DepotId, RawRecord};
use depot_store::record_activity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

/// Clears the in-flight flag when the store operation ends or is dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SessionError> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(SessionError::Busy);
        }
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cloneable handle to one [`EditSession`]
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<EditSession>>,
    in_flight: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Wrap a session
    #[must_use]
    pub fn new(session: EditSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run a synchronous action against the session
    pub async fn with<R>(&self, f: impl FnOnce(&mut EditSession) -> R) -> R {
        let mut session = self.inner.lock().await;
        f(&mut session)
    }

    /// Current phase
    pub async fn phase(&self) -> SessionPhase {
        self.inner.lock().await.phase()
    }

    /// Whether a commit or delete is outstanding
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Commit the pending buffer
    ///
    /// # Errors
    /// - [`SessionError::Busy`] if another store operation is outstanding
    /// - anything [`EditSession::commit`] returns
    pub async fn commit(&self) -> Result<CommitReport, SessionError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        let (plan, (store, activity), actor) = {
            let session = self.inner.lock().await;
            (session.plan_commit()?, session.ports(), session.actor().to_string())
        };

        let written = plan.write(store.as_ref()).await;
        let message = plan.activity_message();
        let report = self.inner.lock().await.finish_commit(plan, written)?;

        if report.read_back != ReadBack::Skipped {
            record_activity(activity.as_ref(), &actor, &message).await;
        }
        Ok(report)
    }

    /// Confirm a pending delete
    ///
    /// # Errors
    /// - [`SessionError::Busy`] if another store operation is outstanding
    /// - anything [`EditSession::confirm_delete`] returns
    pub async fn confirm_delete(&self) -> Result<DepotId, SessionError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        let (id, (store, activity), actor) = {
            let session = self.inner.lock().await;
            (session.plan_delete()?, session.ports(), session.actor().to_string())
        };

        let deleted = store.delete(&id).await;
        let name = self.inner.lock().await.finish_delete(&id, deleted)?;

        record_activity(activity.as_ref(), &actor, &format!("deleted {name}")).await;
        Ok(id)
    }

    /// Feed every snapshot from `snapshots` into the session until the
    /// channel closes
    #[must_use]
    pub fn spawn_snapshot_pump(
        &self,
        mut snapshots: mpsc::UnboundedReceiver<Vec<RawRecord>>,
    ) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            while let Some(records) = snapshots.recv().await {
                let stats = handle.with(|s| s.apply_snapshot(&records)).await;
                debug!(ingested = stats.ingested, skipped = stats.skipped, "snapshot pumped");
            }
        })
    }
}
