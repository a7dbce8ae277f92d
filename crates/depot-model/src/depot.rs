//! Core depot types
//!
//! - [`DepotId`]: opaque store key
//! - [`DepotType`]: base, fuel depot or helipad
//! - [`Depot`]: normalized, store-synced depot record
//! - [`DepotDraft`]: user input for a new depot

use crate::barrels::BarrelCounts;
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Opaque depot identifier assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepotId(String);

impl DepotId {
    /// Wrap a store key
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the raw key
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DepotId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DepotId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Kind of depot; fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepotType {
    /// Staffed base
    Base,
    /// Fuel cache with barrels, tank and trailer
    #[serde(rename = "fueldepot")]
    FuelDepot,
    /// Landing pad
    Helipad,
}

impl DepotType {
    /// Stored string form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::FuelDepot => "fueldepot",
            Self::Helipad => "helipad",
        }
    }

    /// Whether barrel counts mean anything for this type
    #[inline]
    #[must_use]
    pub fn tracks_barrels(&self) -> bool {
        matches!(self, Self::FuelDepot)
    }
}

impl fmt::Display for DepotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "fueldepot" => Ok(Self::FuelDepot),
            "helipad" => Ok(Self::Helipad),
            other => Err(other.to_string()),
        }
    }
}

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Position {
    /// Create position, rejecting out-of-range coordinates
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }
}

/// Normalized depot record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Depot {
    /// Store key
    pub id: DepotId,
    /// Depot kind
    #[serde(rename = "type")]
    pub depot_type: DepotType,
    /// Display name; not unique
    pub name: String,
    /// Map position
    pub position: Position,
    /// Full and empty barrel counts
    #[serde(flatten)]
    pub barrels: BarrelCounts,
    /// Liters in the installed tank
    pub tank: u32,
    /// Liters in the trailer
    pub trailer: u32,
    /// Equipment list, trimmed and non-empty entries
    pub equipment: Vec<String>,
    /// Free-text note
    pub note: Option<String>,
    /// Opaque image references
    pub images: Vec<String>,
    /// Set once by the store
    pub created_at: Option<DateTime<Utc>>,
}

impl Depot {
    /// Create an empty depot of the given type
    #[must_use]
    pub fn new(
        id: impl Into<DepotId>,
        depot_type: DepotType,
        name: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            depot_type,
            name: name.into(),
            position,
            barrels: BarrelCounts::default(),
            tank: 0,
            trailer: 0,
            equipment: Vec::new(),
            note: None,
            images: Vec::new(),
            created_at: None,
        }
    }

    /// With barrel counts
    #[inline]
    #[must_use]
    pub fn with_barrels(mut self, full: u32, empty: u32) -> Self {
        self.barrels = BarrelCounts::new(full, empty);
        self
    }

    /// With tank and trailer volumes
    #[inline]
    #[must_use]
    pub fn with_volumes(mut self, tank: u32, trailer: u32) -> Self {
        self.tank = tank;
        self.trailer = trailer;
        self
    }

    /// With equipment entries
    #[must_use]
    pub fn with_equipment<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.equipment = items.into_iter().map(Into::into).collect();
        self
    }

    /// With note
    #[inline]
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Barrel counts to present, `None` when the type does not track them
    #[inline]
    #[must_use]
    pub fn visible_barrels(&self) -> Option<BarrelCounts> {
        self.depot_type.tracks_barrels().then_some(self.barrels)
    }

    /// Note text, empty when unset
    #[inline]
    #[must_use]
    pub fn note_text(&self) -> &str {
        self.note.as_deref().unwrap_or("")
    }
}

/// User input for a "new depot" click
#[derive(Debug, Clone, PartialEq)]
pub struct DepotDraft {
    /// Depot kind
    pub depot_type: DepotType,
    /// Display name
    pub name: String,
    /// Optional note
    pub note: Option<String>,
    /// Clicked map position
    pub position: Position,
}

impl DepotDraft {
    /// Create draft
    #[inline]
    #[must_use]
    pub fn new(depot_type: DepotType, name: impl Into<String>, position: Position) -> Self {
        Self {
            depot_type,
            name: name.into(),
            note: None,
            position,
        }
    }

    /// With note
    #[inline]
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Store fields for creation: counters at zero, lists empty.
    ///
    /// # Errors
    /// [`ValidationError::EmptyName`] if the name is blank
    pub fn into_fields(self) -> Result<Map<String, Value>, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let note = self
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let mut fields = Map::new();
        fields.insert("type".into(), json!(self.depot_type.as_str()));
        fields.insert("name".into(), json!(name));
        fields.insert(
            "position".into(),
            json!({ "lat": self.position.lat, "lng": self.position.lng }),
        );
        fields.insert("fullBarrels".into(), json!(0));
        fields.insert("emptyBarrels".into(), json!(0));
        fields.insert("tank".into(), json!(0));
        fields.insert("trailer".into(), json!(0));
        fields.insert("equipment".into(), json!([]));
        fields.insert("images".into(), json!([]));
        if let Some(note) = note {
            fields.insert("note".into(), json!(note));
        }
        Ok(fields)
    }
}
