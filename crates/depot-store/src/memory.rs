//! In-memory depot store
//!
//! Backs local runs and tests. Behaves like the hosted store from the
//! caller's side: ULID keys, a `createdAt` stamp on create, shallow field
//! merges on update, and a full snapshot pushed to every listener after
//! each write.

use crate::error::StoreError;
use crate::port::{DepotStore, SnapshotCallback, Subscription};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use depot_model::{DepotId, RawRecord};
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;
use ulid::Ulid;

/// Fields owned by the store, never taken from a write payload
const RESERVED_FIELDS: [&str; 2] = ["id", "createdAt"];

type Listener = Arc<dyn Fn(Vec<RawRecord>) + Send + Sync>;

#[derive(Default)]
struct Inner {
    collection: String,
    documents: RwLock<BTreeMap<DepotId, Map<String, Value>>>,
    listeners: DashMap<u64, Listener>,
    next_listener: AtomicU64,
    injected_failures: Mutex<VecDeque<StoreError>>,
}

impl Inner {
    fn records(&self) -> Vec<RawRecord> {
        self.documents
            .read()
            .iter()
            .map(|(id, fields)| RawRecord::new(id.clone(), fields.clone()))
            .collect()
    }

    fn take_failure(&self) -> Result<(), StoreError> {
        match self.injected_failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn notify(&self) {
        // Clone listeners out first so a callback may unsubscribe itself.
        let listeners: Vec<Listener> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        if listeners.is_empty() {
            return;
        }
        let records = self.records();
        for listener in listeners {
            listener(records.clone());
        }
    }
}

/// Thread-safe in-memory store for a single collection
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store for `collection`
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                collection: collection.into(),
                ..Inner::default()
            }),
        }
    }

    /// Seed documents verbatim, keys and stamps included
    #[must_use]
    pub fn with_records(self, records: impl IntoIterator<Item = RawRecord>) -> Self {
        {
            let mut documents = self.inner.documents.write();
            for record in records {
                documents.insert(record.id, record.fields);
            }
        }
        self
    }

    /// Collection this store serves
    #[inline]
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.inner.collection
    }

    /// Number of documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.documents.read().len()
    }

    /// Whether the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Make the next write (create, update or delete) fail with `err`.
    /// Multiple injections fail successive writes in order.
    pub fn fail_next_write(&self, err: StoreError) {
        self.inner.injected_failures.lock().push_back(err);
    }

    fn strip_reserved(fields: &mut Map<String, Value>) {
        for key in RESERVED_FIELDS {
            fields.remove(key);
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("collection", &self.inner.collection)
            .field("documents", &self.len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[async_trait]
impl DepotStore for MemoryStore {
    async fn create(&self, mut fields: Map<String, Value>) -> Result<DepotId, StoreError> {
        self.inner.take_failure()?;
        Self::strip_reserved(&mut fields);
        fields.insert("createdAt".into(), Value::String(Utc::now().to_rfc3339()));

        let id = DepotId::new(Ulid::new().to_string());
        self.inner.documents.write().insert(id.clone(), fields);
        debug!(depot_id = %id, collection = %self.inner.collection, "document created");

        self.inner.notify();
        Ok(id)
    }

    async fn read(&self, id: &DepotId) -> Result<Option<RawRecord>, StoreError> {
        Ok(self
            .inner
            .documents
            .read()
            .get(id)
            .map(|fields| RawRecord::new(id.clone(), fields.clone())))
    }

    async fn update(&self, id: &DepotId, mut fields: Map<String, Value>) -> Result<(), StoreError> {
        self.inner.take_failure()?;
        Self::strip_reserved(&mut fields);
        {
            let mut documents = self.inner.documents.write();
            let document = documents
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let touched: Vec<&String> = fields.keys().collect();
            debug!(depot_id = %id, fields = ?touched, "document updated");
            document.extend(fields);
        }
        self.inner.notify();
        Ok(())
    }

    async fn delete(&self, id: &DepotId) -> Result<(), StoreError> {
        self.inner.take_failure()?;
        let removed = self.inner.documents.write().remove(id).is_some();
        debug!(depot_id = %id, removed, "document deleted");
        if removed {
            self.inner.notify();
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<RawRecord>, StoreError> {
        Ok(self.inner.records())
    }

    fn subscribe(&self, collection: &str, on_snapshot: SnapshotCallback) -> Subscription {
        if collection != self.inner.collection {
            debug!(
                requested = collection,
                served = %self.inner.collection,
                "subscription to unknown collection ignored"
            );
            return Subscription::noop();
        }

        let key = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::from(on_snapshot);
        listener(self.inner.records());
        self.inner.listeners.insert(key, listener);

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.remove(&key);
            }
        })
    }
}
