//! Config and seed files on disk

use depot_model::DepotId;
use depot_session::DepotBoard;
use depot_tracker::{load_seed, render_list, TrackerConfig, TrackerError};
use pretty_assertions::assert_eq;
use std::io::Write;

#[test]
fn test_load_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "collection = \"depots-test\"\n[housekeeping]\nkeep_backups = 2").unwrap();

    let config = TrackerConfig::load(file.path()).unwrap();
    assert_eq!(config.collection, "depots-test");
    assert_eq!(config.housekeeping.keep_backups, 2);
    assert_eq!(config.excluded(), vec!["admin"]);
}

#[test]
fn test_missing_config_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TrackerConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, TrackerError::Io { .. }));
}

#[test]
fn test_seed_to_sorted_list() {
    let records = depot_test_utils::sample_records();
    let seed: serde_json::Map<String, serde_json::Value> = records
        .into_iter()
        .map(|r| (r.id.as_str().to_string(), serde_json::Value::Object(r.fields)))
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.json");
    std::fs::write(&path, serde_json::to_vec(&seed).unwrap()).unwrap();

    let mut board = DepotBoard::new();
    let stats = board.apply_snapshot(&load_seed(&path).unwrap());
    assert_eq!(stats.ingested, 4);
    assert!(board.contains(&DepotId::new("admin")));

    let text = render_list(&board.list(&["admin"]));
    let names: Vec<&str> = text
        .lines()
        .map(|l| l.split('\t').next().unwrap())
        .collect();
    assert_eq!(names, vec!["akureyri base", "Keflavik Pad", "Vatnajokull Cache"]);
}

#[test]
fn test_configured_exclusions_drive_list() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "excluded_names = [\"admin\", \"Keflavik Pad\"]").unwrap();
    let config = TrackerConfig::load(file.path()).unwrap();

    let mut board = DepotBoard::new();
    board.apply_snapshot(&depot_test_utils::sample_records());

    let names = |excluded: &[&str]| -> Vec<String> {
        board.list(excluded).into_iter().map(|d| d.name.clone()).collect()
    };
    assert_eq!(names(&config.excluded()), vec!["akureyri base", "Vatnajokull Cache"]);

    let flagged = config.with_excluded_names(["akureyri base"]);
    assert_eq!(
        names(&flagged.excluded()),
        vec!["admin", "Keflavik Pad", "Vatnajokull Cache"]
    );
}
