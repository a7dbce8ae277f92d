//! Session phases and the transitions allowed between them

use crate::error::SessionError;
use serde::{Deserialize, Serialize};

/// Observable phase of an edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Nothing selected
    Idle,
    /// A depot is selected, read-only
    Viewing,
    /// A depot is selected with a pending edit buffer
    Editing,
    /// Waiting for the user to confirm or cancel a delete
    ConfirmingDelete,
}

/// Phases reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: SessionPhase) -> Vec<SessionPhase> {
    use SessionPhase::*;
    match from {
        Idle => vec![Idle, Viewing],
        Viewing => vec![Idle, Viewing, Editing, ConfirmingDelete],
        Editing => vec![Idle, Viewing, ConfirmingDelete],
        ConfirmingDelete => vec![Idle, Viewing, Editing],
    }
}

/// Validate a single phase change.
///
/// # Errors
/// [`SessionError::IllegalTransition`] if `to` is not reachable from `from`
pub fn validate_transition(from: SessionPhase, to: SessionPhase) -> Result<(), SessionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(SessionError::IllegalTransition { from, to })
    }
}
