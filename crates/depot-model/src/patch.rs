//! Partial depot updates
//!
//! A [`DepotPatch`] names only the mutable fields that changed. It is what
//! gets sent to the store on commit, so absent fields must never appear in
//! the serialized form.

use crate::depot::Depot;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Changed mutable fields; `None` means untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotPatch {
    /// New full barrel count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_barrels: Option<u32>,
    /// New empty barrel count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_barrels: Option<u32>,
    /// New tank volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tank: Option<u32>,
    /// New trailer volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer: Option<u32>,
    /// Replacement equipment list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Vec<String>>,
    /// Replacement note; empty clears it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DepotPatch {
    /// Whether nothing changed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    /// Stored names of the fields this patch touches
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.full_barrels.is_some() {
            names.push("fullBarrels");
        }
        if self.empty_barrels.is_some() {
            names.push("emptyBarrels");
        }
        if self.tank.is_some() {
            names.push("tank");
        }
        if self.trailer.is_some() {
            names.push("trailer");
        }
        if self.equipment.is_some() {
            names.push("equipment");
        }
        if self.note.is_some() {
            names.push("note");
        }
        names
    }

    /// Store field map holding exactly the touched fields
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(v) = self.full_barrels {
            fields.insert("fullBarrels".into(), json!(v));
        }
        if let Some(v) = self.empty_barrels {
            fields.insert("emptyBarrels".into(), json!(v));
        }
        if let Some(v) = self.tank {
            fields.insert("tank".into(), json!(v));
        }
        if let Some(v) = self.trailer {
            fields.insert("trailer".into(), json!(v));
        }
        if let Some(v) = &self.equipment {
            fields.insert("equipment".into(), json!(v));
        }
        if let Some(v) = &self.note {
            fields.insert("note".into(), json!(v));
        }
        fields
    }

    /// Depot with this patch merged over it
    #[must_use]
    pub fn apply_to(&self, depot: &Depot) -> Depot {
        let mut out = depot.clone();
        if let Some(v) = self.full_barrels {
            out.barrels.full = v;
        }
        if let Some(v) = self.empty_barrels {
            out.barrels.empty = v;
        }
        if let Some(v) = self.tank {
            out.tank = v;
        }
        if let Some(v) = self.trailer {
            out.trailer = v;
        }
        if let Some(v) = &self.equipment {
            out.equipment.clone_from(v);
        }
        if let Some(v) = &self.note {
            out.note = (!v.trim().is_empty()).then(|| v.clone());
        }
        out
    }
}
