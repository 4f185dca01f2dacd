use crate::Store;
use feed::FeedError;
use schema::{ColumnSpec, LogicalRecord, RecordSchema, Transform};

mod runlog_tests;
mod scan_tests;

/// Three columns exercise every writer path: a key, an integer scalar,
/// and a multi-valued column with a dependent table.
pub(crate) fn tiny_schema() -> RecordSchema {
    RecordSchema::new(vec![
        ColumnSpec::scalar("id", Transform::Identity),
        ColumnSpec::scalar("n", Transform::IntWithFallback),
        ColumnSpec::multi("tag", "t_tag", Transform::Identity),
    ])
}

/// In-memory store with fixture tables for [`tiny_schema`]. DDL belongs
/// to the operator in production, so tests carry their own.
pub(crate) fn tiny_store() -> Store {
    let store = Store::open_in_memory().expect("open in-memory store");
    store
        .connection()
        .execute_batch(
            "CREATE TABLE hf (id TEXT PRIMARY KEY, n INTEGER, tag TEXT);
             CREATE TABLE t_tag (id TEXT NOT NULL, value TEXT NOT NULL);
             CREATE TABLE hf_log (hathifile TEXT NOT NULL UNIQUE, applied_at TEXT NOT NULL);",
        )
        .expect("create fixture tables");
    store
}

pub(crate) fn ok_record(schema: &RecordSchema, line: &str) -> Result<LogicalRecord, FeedError> {
    Ok(schema
        .parse(line)
        .expect("parse fixture line")
        .expect("fixture line carries a record"))
}

/// A stream item as the feed layer would produce for an unparseable line.
pub(crate) fn bad_record(schema: &RecordSchema) -> Result<LogicalRecord, FeedError> {
    Err(schema
        .parse("way\ttoo\tmany\tlittle\tfields")
        .expect_err("five fields must not parse")
        .into())
}

pub(crate) fn count(store: &Store, table: &str) -> i64 {
    store
        .connection()
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .expect("count rows")
}
