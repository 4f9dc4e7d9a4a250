use fasta_sync::store::{FastaStore, Source};

#[test]
fn data_survives_reopen() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("fasta.db");

    {
        let mut store = FastaStore::open(&db_path).unwrap();
        store
            .replace_pending("groel", Source::Ncbi, &["1".to_string(), "2".to_string()])
            .unwrap();
        store
            .commit_chunk(
                "groel",
                Source::Ncbi,
                &["1".to_string()],
                &[">1\nAAA".to_string()],
            )
            .unwrap();
    }

    let store = FastaStore::open(&db_path).unwrap();
    assert_eq!(
        store.pending_ids("groel", Source::Ncbi).unwrap(),
        vec!["2".to_string()]
    );
    let completed = store.completed("groel", Source::Ncbi).unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].source_id.as_deref(), Some("1"));
}

#[test]
fn open_is_idempotent_on_existing_schema() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("fasta.db");

    FastaStore::open(&db_path).unwrap();
    let store = FastaStore::open(&db_path).unwrap();
    assert_eq!(store.pending_count("groel", Source::Ncbi).unwrap(), 0);
}
