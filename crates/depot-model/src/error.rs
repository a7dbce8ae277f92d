//! Error types for the depot model
//!
//! Two families:
//! - [`ValidationError`]: bad local input, rejected before it reaches an edit buffer
//! - [`IngestError`]: a stored record that cannot be normalized into a [`Depot`](crate::Depot)

use crate::depot::DepotType;

/// Local input rejected before it is applied
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Volume input did not parse as a non-negative integer
    #[error("{field} must be a non-negative whole number, got {input:?}")]
    NotANumber {
        /// Field the input was meant for
        field: &'static str,
        /// Raw user input
        input: String,
    },

    /// Equipment text was empty after trimming
    #[error("equipment entry is empty")]
    EmptyEquipment,

    /// Depot name was empty after trimming
    #[error("depot name is empty")]
    EmptyName,

    /// Field has no meaning for this depot type
    #[error("{field} does not apply to {depot_type} depots")]
    NotApplicable {
        /// Field that was touched
        field: &'static str,
        /// Type of the depot being edited
        depot_type: DepotType,
    },
}

/// A stored record could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// `type` missing or not one of the known depot types
    #[error("record {id}: unknown depot type {found:?}")]
    UnknownType {
        /// Store key of the record
        id: String,
        /// Raw value found, if any
        found: Option<String>,
    },

    /// Position missing or not a lat/lng pair
    #[error("record {id}: missing or invalid position")]
    InvalidPosition {
        /// Store key of the record
        id: String,
    },
}

impl IngestError {
    /// Store key of the offending record
    #[inline]
    #[must_use]
    pub fn record_id(&self) -> &str {
        match self {
            Self::UnknownType { id, .. } | Self::InvalidPosition { id } => id,
        }
    }
}
