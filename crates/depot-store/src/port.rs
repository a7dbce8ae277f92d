//! Depot record store port
//!
//! The hosted document store is consumed only through [`DepotStore`]. Its
//! replication and consistency behavior are the backend's business; this
//! port promises point reads, shallow-merge updates and a push-based
//! snapshot stream per collection.

use crate::error::StoreError;
use async_trait::async_trait;
use depot_model::{DepotId, RawRecord};
use serde_json::{Map, Value};
use std::fmt;
use tokio::sync::mpsc;

/// Snapshot listener; receives the full collection after every change
pub type SnapshotCallback = Box<dyn Fn(Vec<RawRecord>) + Send + Sync>;

/// Handle to a live snapshot listener.
///
/// Dropping the handle unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Subscription that runs `cancel` once when ended
    #[must_use]
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Subscription with nothing to cancel
    #[inline]
    #[must_use]
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Stop receiving snapshots
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Document store holding one depot collection
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DepotStore: Send + Sync {
    /// Create a document; the store assigns id and `createdAt`
    async fn create(&self, fields: Map<String, Value>) -> Result<DepotId, StoreError>;

    /// Point read; `Ok(None)` if the document does not exist
    async fn read(&self, id: &DepotId) -> Result<Option<RawRecord>, StoreError>;

    /// Shallow-merge `fields` into an existing document
    async fn update(&self, id: &DepotId, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Delete a document
    async fn delete(&self, id: &DepotId) -> Result<(), StoreError>;

    /// Current contents of the whole collection
    async fn snapshot(&self) -> Result<Vec<RawRecord>, StoreError>;

    /// Listen to `collection`; the current contents are delivered first
    fn subscribe(&self, collection: &str, on_snapshot: SnapshotCallback) -> Subscription;
}

/// Bridge a subscription into a channel the view layer can await on
pub fn snapshot_channel(
    store: &dyn DepotStore,
    collection: &str,
) -> (Subscription, mpsc::UnboundedReceiver<Vec<RawRecord>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = store.subscribe(
        collection,
        Box::new(move |records| {
            // Receiver gone means the view closed; nothing left to notify.
            let _ = tx.send(records);
        }),
    );
    (subscription, rx)
}
