use std::fs;

use kbase_vector::{read_index, write_index, FlatIpIndex, IndexDir, IndexMetadata, l2_normalize};

fn sample() -> FlatIpIndex {
    let mut idx = FlatIpIndex::new(3);
    for mut v in [[1.0f32, 2.0, 2.0], [0.0, 0.0, 1.0], [3.0, 0.0, 4.0]] {
        l2_normalize(&mut v);
        idx.add(&v).unwrap();
    }
    idx
}

#[test]
fn index_file_round_trips_and_searches_identically() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = IndexDir::new(tmp.path().join("nested").join("index"));
    let idx = sample();
    write_index(&idx, &dir.index_path()).unwrap();

    let restored = read_index(&dir.index_path()).unwrap();
    assert_eq!(restored, idx);
    let q = [0.0f32, 0.6, 0.8];
    assert_eq!(restored.search(&q, 3).unwrap(), idx.search(&q, 3).unwrap());
}

#[test]
fn rejects_foreign_and_truncated_files() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("semantic.idx");

    fs::write(&path, b"definitely not an index").unwrap();
    assert!(read_index(&path).is_err());

    write_index(&sample(), &path).unwrap();
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();
    assert!(read_index(&path).is_err());

    assert!(read_index(&tmp.path().join("missing.idx")).is_err());
}

#[test]
fn empty_index_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("semantic.idx");
    write_index(&FlatIpIndex::new(8), &path).unwrap();
    let restored = read_index(&path).unwrap();
    assert_eq!(restored.dim(), 8);
    assert!(restored.is_empty());
}

#[test]
fn metadata_sidecar_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = IndexDir::new(tmp.path());
    assert!(!dir.is_complete());

    let meta = IndexMetadata {
        model_name: "hash-xxh64-d64".into(),
        embedding_dim: 64,
        total_documents: 3,
        has_lexical: true,
    };
    meta.write(&dir.metadata_path()).unwrap();
    write_index(&sample(), &dir.index_path()).unwrap();
    assert!(dir.is_complete());
    assert_eq!(IndexMetadata::read(&dir.metadata_path()).unwrap(), meta);
}
