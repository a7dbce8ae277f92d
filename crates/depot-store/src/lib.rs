//! Depot Store
//!
//! Ports to the external collaborators the depot model writes to:
//! - [`DepotStore`]: hosted document collection with live snapshots
//! - [`ActivityLog`]: append-only action log for the admin page
//!
//! Plus in-memory implementations ([`MemoryStore`], [`MemoryActivityLog`])
//! for local runs and tests. Enable the `testing` feature for mockall mocks.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod activity;
pub mod error;
pub mod memory;
pub mod port;

pub use activity::{record_activity, ActivityEntry, ActivityLog, MemoryActivityLog};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use port::{snapshot_channel, DepotStore, SnapshotCallback, Subscription};

#[cfg(any(test, feature = "testing"))]
pub use activity::MockActivityLog;
#[cfg(any(test, feature = "testing"))]
pub use port::MockDepotStore;
