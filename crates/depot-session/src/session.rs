//! Selection / edit session
//!
//! Owns exactly one focused depot and its pending edit buffer, and mediates
//! between user intent and store writes.
//!
//! # Phases
//! - `Idle` → `select` → `Viewing`
//! - `Viewing` → `begin_edit` → `Editing` → `commit` / `cancel_edit` → `Viewing`
//! - `Viewing` / `Editing` → `request_delete` → `ConfirmingDelete`
//!   → `confirm_delete` → `Idle`, or `cancel_delete` → previous phase
//!
//! A store failure never moves the session forward: a failed commit stays
//! in `Editing` with the buffer intact, a failed delete stays in
//! `ConfirmingDelete`.

use crate::auth::AuthGate;
use crate::board::{DepotBoard, SnapshotStats};
use crate::error::SessionError;
use crate::state::{validate_transition, SessionPhase};
use chrono::{DateTime, Utc};
use depot_model::{
    ingest, BarrelCounts, BarrelDirection, Depot, DepotDraft, DepotId, DepotPatch, EditBuffer,
    RawRecord, VolumeField,
};
use depot_store::{record_activity, ActivityLog, DepotStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
enum SessionState {
    Idle,
    Viewing {
        id: DepotId,
    },
    Editing {
        id: DepotId,
        buffer: EditBuffer,
    },
    ConfirmingDelete {
        id: DepotId,
        /// Buffer to restore on cancel; `None` when entered from Viewing
        resume: Option<EditBuffer>,
    },
}

impl SessionState {
    fn phase(&self) -> SessionPhase {
        match self {
            Self::Idle => SessionPhase::Idle,
            Self::Viewing { .. } => SessionPhase::Viewing,
            Self::Editing { .. } => SessionPhase::Editing,
            Self::ConfirmingDelete { .. } => SessionPhase::ConfirmingDelete,
        }
    }

    fn selected(&self) -> Option<&DepotId> {
        match self {
            Self::Idle => None,
            Self::Viewing { id } | Self::Editing { id, .. } | Self::ConfirmingDelete { id, .. } => {
                Some(id)
            }
        }
    }
}

/// How the post-commit read went
#[derive(Debug, Clone, PartialEq)]
pub enum ReadBack {
    /// Nothing changed, no write was sent
    Skipped,
    /// Canonical record replaced with the store's post-update read
    Confirmed,
    /// Write succeeded but the read failed; the patch was merged over the
    /// last-known record instead
    Fallback(StoreError),
}

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    /// Fields sent to the store
    pub patch: DepotPatch,
    /// Post-update read outcome
    pub read_back: ReadBack,
}

/// Store result of a commit write
#[derive(Debug)]
pub(crate) enum Written {
    /// Empty patch, nothing sent
    Skipped,
    /// Update accepted; post-update read outcome
    Stored(Result<Depot, StoreError>),
}

/// Everything a commit needs once the session lock is released
#[derive(Debug, Clone)]
pub(crate) struct CommitPlan {
    id: DepotId,
    base: Depot,
    buffer: EditBuffer,
    patch: DepotPatch,
}

impl CommitPlan {
    /// Send the patch and read the record back
    pub(crate) async fn write(&self, store: &dyn DepotStore) -> Result<Written, StoreError> {
        if self.patch.is_empty() {
            return Ok(Written::Skipped);
        }
        store.update(&self.id, self.patch.to_fields()).await?;
        Ok(Written::Stored(read_back(store, &self.id).await))
    }

    pub(crate) fn activity_message(&self) -> String {
        format!(
            "updated {} ({})",
            self.base.name,
            self.patch.field_names().join(", ")
        )
    }
}

async fn read_back(store: &dyn DepotStore, id: &DepotId) -> Result<Depot, StoreError> {
    let raw = store
        .read(id)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.clone()))?;
    ingest(&raw).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Focused-depot session bound to one store and activity log
pub struct EditSession {
    store: Arc<dyn DepotStore>,
    activity: Arc<dyn ActivityLog>,
    actor: String,
    board: DepotBoard,
    state: SessionState,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("actor", &self.actor)
            .field("depots", &self.board.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Create session acting as `actor`
    #[must_use]
    pub fn new(
        store: Arc<dyn DepotStore>,
        activity: Arc<dyn ActivityLog>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            store,
            activity,
            actor: actor.into(),
            board: DepotBoard::new(),
            state: SessionState::Idle,
        }
    }

    /// Enter the depot views behind `gate`.
    ///
    /// # Errors
    /// [`SessionError::Unauthorized`] if the gate has no valid session at `now`
    pub fn open(
        store: Arc<dyn DepotStore>,
        activity: Arc<dyn ActivityLog>,
        gate: &dyn AuthGate,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if !gate.current_session(now).valid {
            warn!(actor = gate.actor(), "rejected expired session");
            return Err(SessionError::Unauthorized);
        }
        Ok(Self::new(store, activity, gate.actor()))
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// Acting user
    #[inline]
    #[must_use]
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Working set
    #[inline]
    #[must_use]
    pub fn board(&self) -> &DepotBoard {
        &self.board
    }

    /// Depots sorted by name without the `excluded` names
    #[must_use]
    pub fn list(&self, excluded: &[&str]) -> Vec<&Depot> {
        self.board.list(excluded)
    }

    /// Id of the selected depot
    #[inline]
    #[must_use]
    pub fn selected_id(&self) -> Option<&DepotId> {
        self.state.selected()
    }

    /// Canonical record of the selected depot
    #[must_use]
    pub fn selected(&self) -> Option<&Depot> {
        self.state.selected().and_then(|id| self.board.get(id))
    }

    /// Pending buffer, if editing
    #[must_use]
    pub fn buffer(&self) -> Option<&EditBuffer> {
        match &self.state {
            SessionState::Editing { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    /// What the view should show: buffer laid over canonical while editing
    #[must_use]
    pub fn displayed(&self) -> Option<Depot> {
        let canonical = self.selected()?;
        Some(match self.buffer() {
            Some(buffer) => buffer.overlay(canonical),
            None => canonical.clone(),
        })
    }

    /// Merge a store snapshot into the working set.
    ///
    /// The edit buffer is left alone; if the selected depot is gone from the
    /// snapshot, the session drops back to `Idle`.
    pub fn apply_snapshot(&mut self, records: &[RawRecord]) -> SnapshotStats {
        let stats = self.board.apply_snapshot(records);
        if let Some(id) = self.state.selected() {
            if !self.board.contains(id) {
                warn!(depot_id = %id, phase = ?self.phase(), "selected depot removed remotely");
                self.state = SessionState::Idle;
            }
        }
        stats
    }

    fn move_to(&mut self, next: SessionState) -> Result<(), SessionError> {
        let (from, to) = (self.phase(), next.phase());
        validate_transition(from, to)?;
        debug!(?from, ?to, "session transition");
        self.state = next;
        Ok(())
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            operation,
            phase: self.phase(),
        }
    }

    fn canonical(&self, id: &DepotId) -> Result<&Depot, SessionError> {
        self.board
            .get(id)
            .ok_or_else(|| SessionError::UnknownDepot(id.clone()))
    }

    /// Focus `id` read-only, discarding any buffer or pending delete
    ///
    /// # Errors
    /// [`SessionError::UnknownDepot`] if `id` is not in the working set
    pub fn select(&mut self, id: &DepotId) -> Result<(), SessionError> {
        self.canonical(id)?;
        self.move_to(SessionState::Viewing { id: id.clone() })
    }

    /// Drop focus and any buffer
    pub fn deselect(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Start editing the selected depot
    ///
    /// # Errors
    /// [`SessionError::IllegalTransition`] unless `Viewing`
    pub fn begin_edit(&mut self) -> Result<(), SessionError> {
        let SessionState::Viewing { id } = &self.state else {
            return Err(SessionError::IllegalTransition {
                from: self.phase(),
                to: SessionPhase::Editing,
            });
        };
        let id = id.clone();
        self.canonical(&id)?;
        self.move_to(SessionState::Editing {
            id,
            buffer: EditBuffer::new(),
        })
    }

    /// Discard the buffer without writing
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless `Editing`
    pub fn cancel_edit(&mut self) -> Result<(), SessionError> {
        let SessionState::Editing { id, .. } = &self.state else {
            return Err(self.invalid("cancel_edit"));
        };
        let id = id.clone();
        self.move_to(SessionState::Viewing { id })
    }

    fn editing(
        &mut self,
        operation: &'static str,
    ) -> Result<(&Depot, &mut EditBuffer), SessionError> {
        let phase = self.state.phase();
        match &mut self.state {
            SessionState::Editing { id, buffer } => {
                let canonical = self
                    .board
                    .get(id)
                    .ok_or_else(|| SessionError::UnknownDepot(id.clone()))?;
                Ok((canonical, buffer))
            }
            _ => Err(SessionError::InvalidState { operation, phase }),
        }
    }

    /// Move one barrel between full and empty in the buffer
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] unless `Editing`
    /// - [`SessionError::Validation`] if the depot does not track barrels
    pub fn adjust_barrels(
        &mut self,
        direction: BarrelDirection,
    ) -> Result<BarrelCounts, SessionError> {
        let (canonical, buffer) = self.editing("adjust_barrels")?;
        Ok(buffer.adjust_barrels(canonical, direction)?)
    }

    /// Set tank or trailer liters from user input
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] unless `Editing`
    /// - [`SessionError::Validation`] if `input` is not a whole number
    pub fn set_volume(&mut self, field: VolumeField, input: &str) -> Result<u32, SessionError> {
        let (_, buffer) = self.editing("set_volume")?;
        Ok(buffer.set_volume(field, input)?)
    }

    /// Replace the buffered note
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless `Editing`
    pub fn set_note(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        let (_, buffer) = self.editing("set_note")?;
        buffer.set_note(text);
        Ok(())
    }

    /// Append an equipment entry
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] unless `Editing`
    /// - [`SessionError::Validation`] if `text` is blank (nothing is added)
    pub fn add_equipment(&mut self, text: &str) -> Result<(), SessionError> {
        let (canonical, buffer) = self.editing("add_equipment")?;
        Ok(buffer.add_equipment(canonical, text)?)
    }

    /// Remove the equipment entry at `index`; out of range is a no-op
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless `Editing`
    pub fn remove_equipment(&mut self, index: usize) -> Result<Option<String>, SessionError> {
        let (canonical, buffer) = self.editing("remove_equipment")?;
        Ok(buffer.remove_equipment(canonical, index))
    }

    /// Push the buffer's changed fields to the store.
    ///
    /// On success the canonical record is replaced by the store's read-back
    /// and the session moves to `Viewing`. On a failed write nothing moves:
    /// the session stays `Editing` with the buffer intact.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] unless `Editing`
    /// - [`SessionError::Store`] if the update is rejected
    pub async fn commit(&mut self) -> Result<CommitReport, SessionError> {
        let plan = self.plan_commit()?;
        let written = plan.write(self.store.as_ref()).await;
        let message = plan.activity_message();
        let report = self.finish_commit(plan, written)?;
        if report.read_back != ReadBack::Skipped {
            record_activity(self.activity.as_ref(), &self.actor, &message).await;
        }
        Ok(report)
    }

    /// Snapshot what a commit would send, without touching state
    pub(crate) fn plan_commit(&self) -> Result<CommitPlan, SessionError> {
        let SessionState::Editing { id, buffer } = &self.state else {
            return Err(self.invalid("commit"));
        };
        let base = self.canonical(id)?.clone();
        Ok(CommitPlan {
            id: id.clone(),
            patch: buffer.diff(&base),
            buffer: buffer.clone(),
            base,
        })
    }

    /// Fold a finished write back into the session.
    ///
    /// The session only leaves `Editing` if it is still editing the same
    /// depot with the buffer that was sent; edits made while the write was
    /// in flight stay pending.
    pub(crate) fn finish_commit(
        &mut self,
        plan: CommitPlan,
        written: Result<Written, StoreError>,
    ) -> Result<CommitReport, SessionError> {
        let id = plan.id;
        let read_back = match written {
            Err(err) => {
                warn!(depot_id = %id, error = %err, "commit failed; buffer kept");
                return Err(err.into());
            }
            Ok(Written::Skipped) => {
                debug!(depot_id = %id, "commit with no changes");
                ReadBack::Skipped
            }
            Ok(Written::Stored(Ok(depot))) => {
                self.board.upsert(depot);
                ReadBack::Confirmed
            }
            Ok(Written::Stored(Err(err))) => {
                warn!(depot_id = %id, error = %err, "read-after-write failed; using last-known record");
                let last_known = self.board.get(&id).unwrap_or(&plan.base);
                let merged = plan.patch.apply_to(last_known);
                self.board.upsert(merged);
                ReadBack::Fallback(err)
            }
        };

        let settled = matches!(
            &self.state,
            SessionState::Editing { id: current, buffer } if *current == id && *buffer == plan.buffer
        );
        if settled {
            self.move_to(SessionState::Viewing { id: id.clone() })?;
        } else {
            debug!(depot_id = %id, phase = ?self.phase(), "session moved on during commit");
        }
        if read_back != ReadBack::Skipped {
            info!(depot_id = %id, fields = %plan.patch.field_names().join(", "), "depot updated");
        }

        Ok(CommitReport {
            patch: plan.patch,
            read_back,
        })
    }

    /// Ask for delete confirmation
    ///
    /// # Errors
    /// [`SessionError::IllegalTransition`] unless `Viewing` or `Editing`
    pub fn request_delete(&mut self) -> Result<(), SessionError> {
        let next = match &self.state {
            SessionState::Viewing { id } => SessionState::ConfirmingDelete {
                id: id.clone(),
                resume: None,
            },
            SessionState::Editing { id, buffer } => SessionState::ConfirmingDelete {
                id: id.clone(),
                resume: Some(buffer.clone()),
            },
            other => {
                return Err(SessionError::IllegalTransition {
                    from: other.phase(),
                    to: SessionPhase::ConfirmingDelete,
                })
            }
        };
        self.move_to(next)
    }

    /// Return to the phase the delete was requested from, unchanged
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless `ConfirmingDelete`
    pub fn cancel_delete(&mut self) -> Result<(), SessionError> {
        let SessionState::ConfirmingDelete { id, resume } = &self.state else {
            return Err(self.invalid("cancel_delete"));
        };
        let next = match resume {
            Some(buffer) => SessionState::Editing {
                id: id.clone(),
                buffer: buffer.clone(),
            },
            None => SessionState::Viewing { id: id.clone() },
        };
        self.move_to(next)
    }

    /// Delete the depot awaiting confirmation, then go `Idle`.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] unless `ConfirmingDelete`
    /// - [`SessionError::Store`] if the delete fails (session stays put)
    pub async fn confirm_delete(&mut self) -> Result<DepotId, SessionError> {
        let id = self.plan_delete()?;
        let deleted = self.store.delete(&id).await;
        let name = self.finish_delete(&id, deleted)?;
        record_activity(self.activity.as_ref(), &self.actor, &format!("deleted {name}")).await;
        Ok(id)
    }

    /// Id awaiting delete confirmation
    pub(crate) fn plan_delete(&self) -> Result<DepotId, SessionError> {
        match &self.state {
            SessionState::ConfirmingDelete { id, .. } => Ok(id.clone()),
            _ => Err(self.invalid("confirm_delete")),
        }
    }

    /// Fold a finished delete back into the session; returns the depot name
    pub(crate) fn finish_delete(
        &mut self,
        id: &DepotId,
        deleted: Result<(), StoreError>,
    ) -> Result<String, SessionError> {
        if let Err(err) = deleted {
            warn!(depot_id = %id, error = %err, "delete failed");
            return Err(err.into());
        }

        let name = self
            .board
            .remove(id)
            .map_or_else(|| id.to_string(), |d| d.name);
        if self.state.selected() == Some(id) {
            self.move_to(SessionState::Idle)?;
        }
        info!(depot_id = %id, "depot deleted");
        Ok(name)
    }

    /// Store and activity log this session writes through
    pub(crate) fn ports(&self) -> (Arc<dyn DepotStore>, Arc<dyn ActivityLog>) {
        (Arc::clone(&self.store), Arc::clone(&self.activity))
    }

    /// Create a depot from a "new depot" click; does not change focus.
    ///
    /// # Errors
    /// - [`SessionError::Validation`] if the draft name is blank
    /// - [`SessionError::Store`] if the create fails
    pub async fn create_depot(&mut self, draft: DepotDraft) -> Result<DepotId, SessionError> {
        let name = draft.name.trim().to_string();
        let fields = draft.into_fields()?;
        let id = self.store.create(fields).await?;

        match read_back(self.store.as_ref(), &id).await {
            Ok(depot) => self.board.upsert(depot),
            Err(err) => debug!(depot_id = %id, error = %err, "new depot not readable yet"),
        }
        info!(depot_id = %id, name = %name, "depot created");
        record_activity(self.activity.as_ref(), &self.actor, &format!("created {name}")).await;
        Ok(id)
    }
}
