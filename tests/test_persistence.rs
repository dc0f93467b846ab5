use std::fs;

use workflow_forge::domain::generator::generator::WorkflowGenerator;
use workflow_forge::domain::generator::strategy::MinimalStrategy;
use workflow_forge::domain::persistence::workflow_store::{LATEST_FILE_NAME, WorkflowStore};

#[test]
fn test_persist_creates_directory_and_both_copies() {
    let dir = tempfile::tempdir().unwrap();
    let store = WorkflowStore::new(dir.path().join("nested").join("workflows"));
    let document = WorkflowGenerator::offline().generate("Process customer feedback and send notifications");

    let paths = store.persist(&document).expect("persisted");

    assert!(paths.archive.exists());
    assert_eq!(paths.latest, store.directory().join(LATEST_FILE_NAME));
    assert_eq!(fs::read(&paths.archive).unwrap(), fs::read(&paths.latest).unwrap());

    let text = fs::read_to_string(&paths.latest).unwrap();
    assert!(text.starts_with("{\n  \""));
    assert!(text.ends_with("}\n"));
}

#[test]
fn test_latest_is_byte_identical_across_repeated_persists() {
    let dir = tempfile::tempdir().unwrap();
    let store = WorkflowStore::new(dir.path());
    let document = WorkflowGenerator::offline().generate("Managers approve expense reports");

    let first = store.persist(&document).unwrap();
    let first_bytes = fs::read(&first.latest).unwrap();
    let second = store.persist(&document).unwrap();
    let second_bytes = fs::read(&second.latest).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_ne!(first.archive, second.archive);
    assert_eq!(store.archived().unwrap().len(), 2);
}

#[test]
fn test_load_latest_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = WorkflowStore::new(dir.path());

    for document in [WorkflowGenerator::offline().generate("Route qualified leads to HubSpot"), MinimalStrategy.fallback("a 'quoted' description")] {
        store.persist(&document).unwrap();
        let loaded = store.load_latest().unwrap().expect("latest document");
        assert_eq!(loaded, document);
    }
}

#[test]
fn test_load_latest_without_history_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(WorkflowStore::new(dir.path()).load_latest().unwrap().is_none());
}

#[test]
fn test_persistence_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("occupied");
    fs::write(&blocker, b"not a directory").unwrap();

    let store = WorkflowStore::new(&blocker);
    let document = MinimalStrategy.fallback("anything");

    assert!(store.persist(&document).is_none());
    assert!(store.try_persist(&document).is_err());
}

#[test]
fn test_corrupt_latest_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = WorkflowStore::new(dir.path());
    fs::write(store.latest_path(), b"{ not json").unwrap();

    assert!(store.load_latest().is_err());
}
