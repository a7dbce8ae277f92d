//! Depot Session
//!
//! The selection/edit session that sits between the map view and the
//! depot store:
//! - Tracks one focused depot and its pending edit buffer
//! - Commits buffered changes as partial updates, keeping state on failure
//! - Requires a two-step confirmation before deleting
//! - Merges live store snapshots without touching the buffer
//! - Gates access with PIN sessions and an admin password
//!
//! # Example
//!
//! ```rust,ignore
//! use depot_session::{EditSession, SessionPhase};
//!
//! let mut session = EditSession::open(store, activity, &employee_session, Utc::now())?;
//! session.apply_snapshot(&records);
//! session.select(&depot_id)?;
//! session.begin_edit()?;
//! session.adjust_barrels(BarrelDirection::DecreaseFull)?;
//! session.commit().await?;
//! assert_eq!(session.phase(), SessionPhase::Viewing);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod auth;
pub mod board;
pub mod error;
pub mod handle;
pub mod session;
pub mod state;

pub use auth::{
    admin_activity, hash_secret, AdminCookie, AdminGate, AuthConfig, AuthGate, EmployeeId,
    EmployeeSession, EmployeeSummary, PinRegistry, SessionValidity,
};
pub use board::{DepotBoard, SnapshotStats};
pub use error::{AuthError, SessionError};
pub use handle::SessionHandle;
pub use session::{CommitReport, EditSession, ReadBack};
pub use state::{allowed_transitions, validate_transition, SessionPhase};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a depot session
    pub use crate::{
        AuthGate, CommitReport, EditSession, SessionError, SessionHandle, SessionPhase,
    };
    pub use depot_model::{BarrelDirection, DepotDraft, DepotId, VolumeField};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
