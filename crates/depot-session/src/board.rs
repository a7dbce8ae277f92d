//! Working set of canonical depots

use depot_model::{ingest, list_depots, search_depots, Depot, DepotId, RawRecord};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Outcome of merging one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Records normalized into the working set
    pub ingested: usize,
    /// Records skipped because they failed ingest
    pub skipped: usize,
}

/// Latest store-synced view of every depot
#[derive(Debug, Clone, Default)]
pub struct DepotBoard {
    depots: BTreeMap<DepotId, Depot>,
}

impl DepotBoard {
    /// Create empty board
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the working set with a snapshot
    pub fn apply_snapshot(&mut self, records: &[RawRecord]) -> SnapshotStats {
        let mut stats = SnapshotStats::default();
        let mut next = BTreeMap::new();
        for record in records {
            match ingest(record) {
                Ok(depot) => {
                    next.insert(depot.id.clone(), depot);
                    stats.ingested += 1;
                }
                Err(err) => {
                    warn!(depot_id = %record.id, error = %err, "skipping unreadable depot record");
                    stats.skipped += 1;
                }
            }
        }
        self.depots = next;
        debug!(ingested = stats.ingested, skipped = stats.skipped, "snapshot applied");
        stats
    }

    /// Canonical record for `id`
    #[inline]
    #[must_use]
    pub fn get(&self, id: &DepotId) -> Option<&Depot> {
        self.depots.get(id)
    }

    /// Whether `id` is in the working set
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &DepotId) -> bool {
        self.depots.contains_key(id)
    }

    /// Insert or replace one record
    pub fn upsert(&mut self, depot: Depot) {
        self.depots.insert(depot.id.clone(), depot);
    }

    /// Drop one record
    pub fn remove(&mut self, id: &DepotId) -> Option<Depot> {
        self.depots.remove(id)
    }

    /// Number of depots
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.depots.len()
    }

    /// Whether the board is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depots.is_empty()
    }

    /// Depots sorted by name without the `excluded` names
    #[must_use]
    pub fn list(&self, excluded: &[&str]) -> Vec<&Depot> {
        list_depots(self.depots.values(), excluded)
    }

    /// Name search in list order
    #[must_use]
    pub fn search(&self, query: &str, excluded: &[&str]) -> Vec<&Depot> {
        search_depots(self.depots.values(), query, excluded)
    }
}
