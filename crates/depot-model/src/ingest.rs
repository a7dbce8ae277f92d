//! Store boundary normalization
//!
//! Stored depot documents come in several historical shapes: numbers saved
//! as strings, equipment saved as one newline-delimited string, barrel
//! counts under the legacy `full`/`empty` keys. [`ingest`] is the single
//! place that reconciles them; everything downstream sees only [`Depot`].

use crate::barrels::BarrelCounts;
use crate::depot::{Depot, DepotId, DepotType, Position};
use crate::error::IngestError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document as delivered by the store: key plus untyped payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Document key
    pub id: DepotId,
    /// Document fields
    pub fields: Map<String, Value>,
}

impl RawRecord {
    /// Create record
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<DepotId>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a record from a JSON object literal; non-objects yield no fields
    #[must_use]
    pub fn from_json(id: impl Into<DepotId>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, fields)
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// First present key wins
    fn get_any(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| self.get(k).filter(|v| !v.is_null()))
    }
}

/// Normalize a stored record into a [`Depot`].
///
/// The id always comes from the record key, never from the payload.
///
/// # Errors
/// - [`IngestError::UnknownType`] if `type` is missing or unrecognized
/// - [`IngestError::InvalidPosition`] if no usable lat/lng pair is present
pub fn ingest(record: &RawRecord) -> Result<Depot, IngestError> {
    let type_value = record.get("type").and_then(Value::as_str);
    let depot_type = type_value
        .and_then(|s| s.parse::<DepotType>().ok())
        .ok_or_else(|| IngestError::UnknownType {
            id: record.id.to_string(),
            found: type_value.map(str::to_string),
        })?;

    let position = read_position(record).ok_or_else(|| IngestError::InvalidPosition {
        id: record.id.to_string(),
    })?;

    let name = record
        .get("name")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let barrels = BarrelCounts::new(
        coerce_count(record.get_any(&["fullBarrels", "full"])),
        coerce_count(record.get_any(&["emptyBarrels", "empty"])),
    );

    let note = record
        .get("note")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string);

    Ok(Depot {
        id: record.id.clone(),
        depot_type,
        name,
        position,
        barrels,
        tank: coerce_count(record.get("tank")),
        trailer: coerce_count(record.get("trailer")),
        equipment: normalize_equipment(record.get("equipment")),
        note,
        images: read_images(record.get("images")),
        created_at: record.get("createdAt").and_then(read_timestamp),
    })
}

/// Coerce a numeric-like value to a non-negative count.
///
/// Missing, null, non-numeric and negative values all become 0; fractions
/// are truncated; values past `u32::MAX` saturate.
#[must_use]
pub fn coerce_count(value: Option<&Value>) -> u32 {
    let number = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|u| u as f64)
            .or_else(|| n.as_f64()),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() && n > 0.0 => {
            if n >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                n.trunc() as u32
            }
        }
        _ => 0,
    }
}

/// Equipment as a list of trimmed, non-empty entries.
///
/// Accepts a JSON list or a single newline-delimited string.
#[must_use]
pub fn normalize_equipment(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter_map(clean_entry)
            .collect(),
        Some(Value::String(text)) => text.lines().filter_map(clean_entry).collect(),
        _ => Vec::new(),
    }
}

/// Trimmed entry, `None` when blank
pub(crate) fn clean_entry(entry: impl AsRef<str>) -> Option<String> {
    let trimmed = entry.as_ref().trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn read_position(record: &RawRecord) -> Option<Position> {
    let pair = |obj: &Map<String, Value>| {
        let lat = obj.get("lat").or_else(|| obj.get("latitude"))?;
        let lng = obj
            .get("lng")
            .or_else(|| obj.get("lon"))
            .or_else(|| obj.get("longitude"))?;
        Position::new(read_float(lat)?, read_float(lng)?)
    };

    match record.get("position") {
        Some(Value::Object(obj)) => pair(obj),
        _ => pair(&record.fields),
    }
}

fn read_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn read_images(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// RFC 3339 string, epoch milliseconds, or a `{seconds, nanoseconds}` object
fn read_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::Object(obj) => {
            let secs = obj.get("seconds").and_then(Value::as_i64)?;
            let nanos = obj
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            DateTime::from_timestamp(secs, nanos)
        }
        _ => None,
    }
}
