//! Depot Model
//!
//! In-memory view of the depot collection:
//! - Normalizes heterogeneous stored records ([`ingest`])
//! - Orders and filters depots for display ([`list_depots`])
//! - Enforces the barrel transfer rule ([`BarrelCounts::transfer`])
//! - Holds unsaved edits and diffs them against the canonical record ([`EditBuffer`])
//!
//! # Example
//!
//! ```rust
//! use depot_model::{ingest, BarrelDirection, EditBuffer, RawRecord};
//! use serde_json::json;
//!
//! let record = RawRecord::from_json(
//!     "north",
//!     json!({
//!         "type": "fueldepot",
//!         "name": "North Cache",
//!         "position": { "lat": 64.1, "lng": -21.9 },
//!         "fullBarrels": 3,
//!         "emptyBarrels": "2",
//!         "equipment": "Rope\nShovel\n",
//!     }),
//! );
//! let depot = ingest(&record).unwrap();
//! assert_eq!(depot.equipment, ["Rope", "Shovel"]);
//!
//! let mut buffer = EditBuffer::new();
//! buffer.adjust_barrels(&depot, BarrelDirection::IncreaseFull).unwrap();
//! assert_eq!(buffer.diff(&depot).to_fields().len(), 2);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod barrels;
pub mod buffer;
pub mod depot;
pub mod error;
pub mod ingest;
pub mod listing;
pub mod patch;

pub use barrels::{BarrelCounts, BarrelDirection};
pub use buffer::{EditBuffer, VolumeField};
pub use depot::{Depot, DepotDraft, DepotId, DepotType, Position};
pub use error::{IngestError, ValidationError};
pub use ingest::{coerce_count, ingest, normalize_equipment, RawRecord};
pub use listing::{list_depots, name_order, search_depots};
pub use patch::DepotPatch;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
