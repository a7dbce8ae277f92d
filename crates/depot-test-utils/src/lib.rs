//! Testing utilities for the depot tracker workspace
//!
//! Shared fixtures: raw store records, canonical depots, seeded stores.

#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use depot_model::{Depot, DepotId, DepotType, Position, RawRecord};
use depot_store::{MemoryActivityLog, MemoryStore};
use serde_json::json;

pub const COLLECTION: &str = "depots";

pub fn fuel_record(id: &str, name: &str, full: u32, empty: u32) -> RawRecord {
    RawRecord::from_json(
        id,
        json!({
            "type": "fueldepot",
            "name": name,
            "position": { "lat": 64.13, "lng": -21.94 },
            "fullBarrels": full,
            "emptyBarrels": empty,
            "tank": 1200,
            "trailer": 300,
            "equipment": ["Pump", "Hose"],
            "note": "",
        }),
    )
}

pub fn base_record(id: &str, name: &str) -> RawRecord {
    RawRecord::from_json(
        id,
        json!({
            "type": "base",
            "name": name,
            "position": { "lat": 65.68, "lng": -18.09 },
            "equipment": ["Radio"],
        }),
    )
}

pub fn helipad_record(id: &str, name: &str) -> RawRecord {
    RawRecord::from_json(
        id,
        json!({
            "type": "helipad",
            "name": name,
            "lat": 63.98,
            "lng": -22.6,
        }),
    )
}

/// Three depots of each kind plus the reserved "admin" entry
pub fn sample_records() -> Vec<RawRecord> {
    vec![
        fuel_record("fuel-1", "Vatnajokull Cache", 3, 2),
        base_record("base-1", "akureyri base"),
        helipad_record("heli-1", "Keflavik Pad"),
        base_record("admin", "admin"),
    ]
}

pub fn fuel_depot(id: &str) -> Depot {
    Depot::new(
        DepotId::new(id),
        DepotType::FuelDepot,
        "Cache",
        Position::new(64.0, -21.0).unwrap(),
    )
    .with_barrels(3, 2)
    .with_volumes(1200, 300)
    .with_equipment(["Pump"])
}

pub fn seeded_store() -> MemoryStore {
    MemoryStore::new(COLLECTION).with_records(sample_records())
}

pub fn empty_activity() -> MemoryActivityLog {
    MemoryActivityLog::new()
}

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}
