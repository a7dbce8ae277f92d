//! Edit session tests against the in-memory store
//!
//! Covers the full select / edit / commit / delete cycle, store failures,
//! and the live snapshot merge.

use depot_model::{BarrelCounts, BarrelDirection, DepotDraft, DepotId, DepotType, Position, RawRecord, VolumeField};
use depot_session::prelude::*;
use depot_session::ReadBack;
use depot_store::{ActivityLog, DepotStore, MemoryActivityLog, MemoryStore, MockDepotStore, StoreError};
use depot_test_utils::{fuel_record, seeded_store, COLLECTION};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn session_over(store: &MemoryStore, activity: &Arc<MemoryActivityLog>) -> EditSession {
    let store: Arc<dyn DepotStore> = Arc::new(store.clone());
    let activity: Arc<dyn ActivityLog> = activity.clone();
    EditSession::new(store, activity, "Sigga")
}

async fn synced(store: &MemoryStore, activity: &Arc<MemoryActivityLog>) -> EditSession {
    let mut session = session_over(store, activity);
    let records = store.snapshot().await.unwrap();
    session.apply_snapshot(&records);
    session
}

#[tokio::test]
async fn test_barrel_transfer_clamps_and_commits() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;
    let id = DepotId::new("fuel-1");

    session.select(&id).unwrap();
    session.begin_edit().unwrap();
    assert_eq!(
        session.adjust_barrels(BarrelDirection::IncreaseFull).unwrap(),
        BarrelCounts::new(4, 1)
    );
    for _ in 0..5 {
        session.adjust_barrels(BarrelDirection::DecreaseFull).unwrap();
    }
    assert_eq!(session.displayed().unwrap().barrels, BarrelCounts::new(0, 5));

    let report = session.commit().await.unwrap();
    assert_eq!(report.read_back, ReadBack::Confirmed);
    assert_eq!(report.patch.field_names(), vec!["fullBarrels", "emptyBarrels"]);
    assert_eq!(session.phase(), SessionPhase::Viewing);
    assert_eq!(session.selected().unwrap().barrels, BarrelCounts::new(0, 5));

    let stored = store.read(&id).await.unwrap().unwrap();
    assert_eq!(stored.fields["fullBarrels"], json!(0));
    assert_eq!(stored.fields["emptyBarrels"], json!(5));
    assert_eq!(stored.fields["tank"], json!(1200));
}

#[tokio::test]
async fn test_barrels_rejected_on_base() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;

    session.select(&DepotId::new("base-1")).unwrap();
    session.begin_edit().unwrap();
    let err = session.adjust_barrels(BarrelDirection::IncreaseFull).unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_note_only_commit_sends_only_note() {
    let mut store = MockDepotStore::new();
    store
        .expect_update()
        .withf(|id, fields| {
            id.as_str() == "fuel-1"
                && fields.len() == 1
                && fields.get("note") == Some(&json!("checked"))
        })
        .times(1)
        .returning(|_, _| Ok(()));
    store.expect_read().times(1).returning(|id| {
        let mut record = fuel_record(id.as_str(), "Cache", 3, 2);
        record.fields.insert("note".into(), json!("checked"));
        Ok(Some(record))
    });

    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = EditSession::new(Arc::new(store), activity.clone(), "Sigga");
    session.apply_snapshot(&[fuel_record("fuel-1", "Cache", 3, 2)]);

    session.select(&DepotId::new("fuel-1")).unwrap();
    session.begin_edit().unwrap();
    session.set_note("checked").unwrap();
    let report = session.commit().await.unwrap();

    assert_eq!(report.patch.field_names(), vec!["note"]);
    assert_eq!(session.selected().unwrap().note_text(), "checked");

    let entries = activity.entries(10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].actor, "Sigga");
    assert_eq!(entries[0].message, "updated Cache (note)");
}

#[tokio::test]
async fn test_failed_commit_keeps_buffer_and_retries() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;
    let id = DepotId::new("fuel-1");

    session.select(&id).unwrap();
    session.begin_edit().unwrap();
    session.set_volume(VolumeField::Tank, "450").unwrap();
    session.add_equipment("  Funnel ").unwrap();

    store.fail_next_write(StoreError::Network("offline".into()));
    let err = session.commit().await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(session.phase(), SessionPhase::Editing);

    let canonical = session.selected().unwrap().clone();
    let buffer = session.buffer().unwrap();
    assert_eq!(buffer.volume_text(&canonical, VolumeField::Tank), "450");
    assert_eq!(buffer.equipment(&canonical), ["Pump", "Hose", "Funnel"]);
    assert_eq!(canonical.tank, 1200);
    assert!(activity.is_empty());

    session.commit().await.unwrap();
    let stored = store.read(&id).await.unwrap().unwrap();
    assert_eq!(stored.fields["tank"], json!(450));
    assert_eq!(stored.fields["equipment"], json!(["Pump", "Hose", "Funnel"]));
}

#[tokio::test]
async fn test_invalid_volume_rejected_locally() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;

    session.select(&DepotId::new("fuel-1")).unwrap();
    session.begin_edit().unwrap();
    let err = session.set_volume(VolumeField::Trailer, "lots").unwrap_err();
    assert!(err.is_validation());

    let report = session.commit().await.unwrap();
    assert_eq!(report.read_back, ReadBack::Skipped);
}

#[tokio::test]
async fn test_equipment_edits() {
    let store = MemoryStore::new(COLLECTION).with_records([RawRecord::from_json(
        "rope",
        json!({
            "type": "base",
            "name": "Hut",
            "position": { "lat": 64.0, "lng": -20.0 },
            "equipment": ["Rope", ""],
        }),
    )]);
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;

    session.select(&DepotId::new("rope")).unwrap();
    session.begin_edit().unwrap();
    let canonical = session.selected().unwrap().clone();
    assert_eq!(session.buffer().unwrap().equipment(&canonical), ["Rope"]);

    session.add_equipment("Shovel").unwrap();
    assert!(session.add_equipment("   ").unwrap_err().is_validation());
    assert_eq!(session.remove_equipment(5).unwrap(), None);
    assert_eq!(
        session.buffer().unwrap().equipment(&canonical),
        ["Rope", "Shovel"]
    );

    assert_eq!(session.remove_equipment(0).unwrap(), Some("Rope".to_string()));
    session.commit().await.unwrap();
    assert_eq!(session.selected().unwrap().equipment, vec!["Shovel".to_string()]);
}

#[tokio::test]
async fn test_cancel_edit_discards_buffer() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;

    session.select(&DepotId::new("fuel-1")).unwrap();
    session.begin_edit().unwrap();
    session.set_note("scratch").unwrap();
    session.cancel_edit().unwrap();

    assert_eq!(session.phase(), SessionPhase::Viewing);
    assert!(session.buffer().is_none());
    assert_eq!(session.displayed().unwrap().note_text(), "");
}

#[tokio::test]
async fn test_delete_needs_confirmation() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;
    let id = DepotId::new("heli-1");

    session.select(&id).unwrap();
    session.request_delete().unwrap();
    assert_eq!(session.phase(), SessionPhase::ConfirmingDelete);
    assert!(store.read(&id).await.unwrap().is_some());

    session.cancel_delete().unwrap();
    assert_eq!(session.phase(), SessionPhase::Viewing);

    session.request_delete().unwrap();
    assert_eq!(session.confirm_delete().await.unwrap(), id);
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(store.read(&id).await.unwrap().is_none());
    assert!(!session.board().contains(&id));

    let entries = activity.entries(1).await.unwrap();
    assert_eq!(entries[0].message, "deleted Keflavik Pad");
}

#[tokio::test]
async fn test_cancel_delete_restores_edit_buffer() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;

    session.select(&DepotId::new("fuel-1")).unwrap();
    session.begin_edit().unwrap();
    session.adjust_barrels(BarrelDirection::IncreaseFull).unwrap();
    session.request_delete().unwrap();
    assert!(session.buffer().is_none());

    session.cancel_delete().unwrap();
    assert_eq!(session.phase(), SessionPhase::Editing);
    assert_eq!(session.displayed().unwrap().barrels, BarrelCounts::new(4, 1));
}

#[tokio::test]
async fn test_failed_delete_stays_confirming() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;
    let id = DepotId::new("base-1");

    session.select(&id).unwrap();
    session.request_delete().unwrap();
    store.fail_next_write(StoreError::PermissionDenied("read-only".into()));

    let err = session.confirm_delete().await.unwrap_err();
    assert_eq!(err, SessionError::Store(StoreError::PermissionDenied("read-only".into())));
    assert_eq!(session.phase(), SessionPhase::ConfirmingDelete);
    assert!(session.board().contains(&id));

    session.confirm_delete().await.unwrap();
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn test_reselect_discards_buffer() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;

    session.select(&DepotId::new("fuel-1")).unwrap();
    session.begin_edit().unwrap();
    session.set_note("draft").unwrap();
    session.select(&DepotId::new("base-1")).unwrap();

    assert_eq!(session.phase(), SessionPhase::Viewing);
    assert_eq!(session.selected_id(), Some(&DepotId::new("base-1")));
    assert!(session.buffer().is_none());
}

#[tokio::test]
async fn test_create_depot_adds_to_board() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;

    let draft = DepotDraft::new(
        DepotType::FuelDepot,
        " Hella Drop ",
        Position::new(63.83, -20.4).unwrap(),
    );
    let id = session.create_depot(draft).await.unwrap();

    assert_eq!(session.phase(), SessionPhase::Idle);
    let depot = session.board().get(&id).unwrap();
    assert_eq!(depot.name, "Hella Drop");
    assert_eq!(depot.barrels, BarrelCounts::new(0, 0));
    assert!(depot.equipment.is_empty());
    assert!(depot.created_at.is_some());

    let entries = activity.entries(1).await.unwrap();
    assert_eq!(entries[0].message, "created Hella Drop");
}

#[tokio::test]
async fn test_list_excludes_admin_entry() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let session = synced(&store, &activity).await;

    let names: Vec<&str> = session
        .list(&["admin"])
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, vec!["akureyri base", "Keflavik Pad", "Vatnajokull Cache"]);
}

#[tokio::test]
async fn test_remote_change_does_not_touch_buffer() {
    let store = seeded_store();
    let activity = Arc::new(MemoryActivityLog::new());
    let mut session = synced(&store, &activity).await;
    let id = DepotId::new("fuel-1");

    session.select(&id).unwrap();
    session.begin_edit().unwrap();
    session.set_note("mine").unwrap();

    // Another client changes the tank while we edit.
    let mut fields = serde_json::Map::new();
    fields.insert("tank".into(), json!(10));
    store.update(&id, fields).await.unwrap();
    let records = store.snapshot().await.unwrap();
    session.apply_snapshot(&records);

    assert_eq!(session.phase(), SessionPhase::Editing);
    let report = session.commit().await.unwrap();
    assert_eq!(report.patch.field_names(), vec!["note"]);

    let stored = store.read(&id).await.unwrap().unwrap();
    assert_eq!(stored.fields["tank"], json!(10));
    assert_eq!(stored.fields["note"], json!("mine"));
}
