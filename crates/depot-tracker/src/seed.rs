//! Seed data for the in-memory store
//!
//! Accepts either a plain JSON object keyed by depot id, or a backup file
//! written by the backup job (its `depots` object is used).

use crate::error::TrackerError;
use depot_model::RawRecord;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Parse seed JSON
///
/// # Errors
/// - [`TrackerError::Seed`] if the text is not JSON
/// - [`TrackerError::SeedShape`] if it is not an object of objects
pub fn parse_seed(text: &str) -> Result<Vec<RawRecord>, TrackerError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(mut root) = value else {
        return Err(TrackerError::SeedShape);
    };

    let documents = match root.remove("depots") {
        Some(Value::Object(depots)) if root.contains_key("takenAt") => depots,
        Some(other) => {
            root.insert("depots".to_string(), other);
            root
        }
        None => root,
    };

    documents
        .into_iter()
        .map(|(id, fields)| match fields {
            Value::Object(fields) => Ok(RawRecord::new(id, fields)),
            _ => Err(TrackerError::SeedShape),
        })
        .collect()
}

/// Read and parse a seed file
///
/// # Errors
/// [`TrackerError::Io`] if the file cannot be read, or any [`parse_seed`] error
pub fn load_seed(path: &Path) -> Result<Vec<RawRecord>, TrackerError> {
    let text = std::fs::read_to_string(path).map_err(|e| TrackerError::io(path, e))?;
    let records = parse_seed(&text)?;
    debug!(path = %path.display(), records = records.len(), "seed loaded");
    Ok(records)
}
