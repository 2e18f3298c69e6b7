use imgmatch::{FeatureRecord, FeatureStore, ImgMatchError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use tempfile::TempDir;

fn random_store(seed: u64, records: usize, dim: usize) -> FeatureStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let records = (0..records)
        .map(|i| {
            let vector = (0..dim).map(|_| rng.random_range(-1e3f32..1e3)).collect();
            FeatureRecord::new(format!("pic.{i:04}.jpg"), vector)
        })
        .collect();
    FeatureStore::from_records(records).unwrap()
}

#[test]
fn file_roundtrip_preserves_ids_order_and_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("features.csv");

    let store = random_store(3, 25, 17);
    store.write_to(&path).unwrap();
    let loaded = FeatureStore::read_from(&path).unwrap();

    assert_eq!(loaded.records(), store.records());
}

#[test]
fn write_replaces_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("features.csv");
    fs::write(&path, "old.jpg,1,2,3\nstale.jpg,4,5,6\n").unwrap();

    let store = FeatureStore::from_records(vec![FeatureRecord::new("new.jpg", vec![0.25])]).unwrap();
    store.write_to(&path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "new.jpg,0.25\n");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = FeatureStore::read_from(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, ImgMatchError::Io { .. }));
}

#[test]
fn embedding_file_with_header_free_rows_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("embeddings.csv");
    fs::write(&path, "pic.0164.jpg, 0.1, -0.2, 0.3\npic.0080.jpg,1e-3,2.5,-4\n").unwrap();

    let store = FeatureStore::read_from(&path).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(
        store.require("pic.0080.jpg").unwrap().vector,
        vec![1e-3, 2.5, -4.0]
    );
}

#[test]
fn parse_error_reports_line_number() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.csv");
    fs::write(&path, "a.jpg,1\n\nb.jpg,nan?\n").unwrap();

    let err = FeatureStore::read_from(&path).unwrap_err();
    assert!(matches!(err, ImgMatchError::Parse { line: 3, .. }));
}
