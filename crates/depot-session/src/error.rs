//! Error types for depot sessions
//!
//! Provides error handling for:
//! - Local validation failures (rejected before reaching the buffer)
//! - Store failures (session stays where it was so the user can retry)
//! - Out-of-phase operations
//! - PIN and admin authentication

use crate::state::SessionPhase;
use depot_model::{DepotId, IngestError, ValidationError};
use depot_store::StoreError;

/// Edit session error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Bad local input
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Store create/update/delete failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Stored record could not be normalized
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Phase change not in the transition table
    #[error("illegal transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current phase
        from: SessionPhase,
        /// Requested phase
        to: SessionPhase,
    },

    /// Operation not valid in the current phase
    #[error("{operation} not allowed while {phase:?}")]
    InvalidState {
        /// Operation attempted
        operation: &'static str,
        /// Phase at the time
        phase: SessionPhase,
    },

    /// Depot not in the working set
    #[error("unknown depot: {0}")]
    UnknownDepot(DepotId),

    /// A commit or delete is already outstanding on this session
    #[error("another store operation is in flight")]
    Busy,

    /// No valid login session
    #[error("session expired or missing")]
    Unauthorized,
}

impl SessionError {
    /// Whether the user can retry the same action unchanged
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            Self::Busy => true,
            _ => false,
        }
    }

    /// Whether the user must fix their input first
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// PIN and admin gate errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    /// PIN is not all digits or has the wrong length
    #[error("PIN must be {min}-{max} digits")]
    InvalidPin {
        /// Minimum length
        min: usize,
        /// Maximum length
        max: usize,
    },

    /// Another employee already uses this PIN
    #[error("PIN already in use")]
    DuplicatePin,

    /// No employee has this PIN
    #[error("unknown PIN")]
    UnknownPin,

    /// Employee name was blank
    #[error("employee name is empty")]
    EmptyName,

    /// No employee with this id
    #[error("unknown employee: {0}")]
    UnknownEmployee(String),

    /// Admin password did not match
    #[error("wrong admin password")]
    WrongPassword,

    /// Admin password is not configured
    #[error("admin access not configured")]
    NotConfigured,

    /// Action needs a valid admin cookie
    #[error("admin login required")]
    AdminRequired,

    /// Activity log read failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
