use super::{count, tiny_store};

#[test]
fn fresh_log_knows_nothing() {
    let store = tiny_store();
    assert!(!store.is_applied("hathi_full_20240101.txt.gz").unwrap());
    assert!(store.applied_files().unwrap().is_empty());
}

#[test]
fn recorded_file_is_applied() {
    let store = tiny_store();
    store.record_applied("hathi_full_20240101.txt.gz").unwrap();

    assert!(store.is_applied("hathi_full_20240101.txt.gz").unwrap());
    assert!(!store.is_applied("hathi_upd_20240102.txt.gz").unwrap());
}

#[test]
fn rerecording_refreshes_instead_of_duplicating() {
    let store = tiny_store();
    store.record_applied("hathi_full_20240101.txt.gz").unwrap();
    store.record_applied("hathi_full_20240101.txt.gz").unwrap();

    assert_eq!(count(&store, "hf_log"), 1);
    let applied_at: String = store
        .connection()
        .query_row(
            "SELECT applied_at FROM hf_log WHERE hathifile = 'hathi_full_20240101.txt.gz'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert!(!applied_at.is_empty());
}

#[test]
fn applied_files_lists_every_name() {
    let store = tiny_store();
    store.record_applied("hathi_full_20240101.txt.gz").unwrap();
    store.record_applied("hathi_upd_20240102.txt.gz").unwrap();
    store.record_applied("hathi_upd_20240103.txt.gz").unwrap();

    let mut names = store.applied_files().unwrap();
    names.sort();
    assert_eq!(
        names,
        vec![
            "hathi_full_20240101.txt.gz",
            "hathi_upd_20240102.txt.gz",
            "hathi_upd_20240103.txt.gz",
        ]
    );
}
