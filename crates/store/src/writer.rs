//! The batched, transactional writer.
//!
//! One call to [`Store::apply`] is one transaction. Records are upserted
//! in fixed-size batches, each batch a delete of the batch keys across
//! every table followed by plain inserts; no native upsert is assumed, and
//! a record replaces all of its earlier rows including the dependent-table
//! ones. Deletions run after the upserts, batched the same way. The run
//! log entry for the source file is written inside the same transaction,
//! so a file is recorded as applied exactly when all of its effects are.
//!
//! Failure handling follows the recoverable/fatal split: a line that
//! failed to parse costs that one record (logged, counted, skipped), while
//! any database or I/O error aborts the whole call and the dropped
//! transaction rolls everything back, log entry included.

use feed::FeedError;
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use schema::{LogicalRecord, RecordSchema, Scalar};

use crate::{runlog, Store, StoreError};

/// Records per delete-then-insert batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Progress is logged every this many records consumed.
const LOG_REPORT_CHUNK: u64 = 5000;

/// What one [`Store::apply`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Records upserted into the main and dependent tables.
    pub records_written: u64,
    /// Keys removed by the deletion pass.
    pub records_deleted: u64,
    /// Records dropped because their line failed to parse.
    pub records_skipped: u64,
}

impl Store {
    /// Applies a stream of records and a stream of deletions in one
    /// transaction, then records `source` in the run log when given.
    ///
    /// `batch_size` is clamped to at least 1; [`DEFAULT_BATCH_SIZE`] is
    /// the production setting.
    pub fn apply<R, D>(
        &mut self,
        schema: &RecordSchema,
        records: R,
        deletes: D,
        source: Option<&str>,
        batch_size: usize,
    ) -> Result<ApplyOutcome, StoreError>
    where
        R: IntoIterator<Item = Result<LogicalRecord, FeedError>>,
        D: IntoIterator<Item = std::io::Result<String>>,
    {
        let batch_size = batch_size.max(1);
        let tx = self.conn.transaction()?;
        let mut outcome = ApplyOutcome::default();
        let mut seen: u64 = 0;
        let mut batch: Vec<LogicalRecord> = Vec::with_capacity(batch_size);

        for item in records {
            seen += 1;
            match item {
                Ok(record) => batch.push(record),
                Err(FeedError::Parse(e)) => {
                    warn!("skipping record: {e}");
                    outcome.records_skipped += 1;
                }
                Err(FeedError::Io(e)) => return Err(e.into()),
            }
            if batch.len() >= batch_size {
                write_batch(&tx, schema, &batch)?;
                outcome.records_written += batch.len() as u64;
                batch.clear();
            }
            if seen % LOG_REPORT_CHUNK == 0 {
                info!(
                    "(upsert) records written/seen: {}/{seen}",
                    outcome.records_written
                );
            }
        }
        if !batch.is_empty() {
            write_batch(&tx, schema, &batch)?;
            outcome.records_written += batch.len() as u64;
            batch.clear();
        }
        info!(
            "(upsert done) records written/seen: {}/{seen}",
            outcome.records_written
        );

        let mut keys: Vec<String> = Vec::with_capacity(batch_size);
        for key in deletes {
            keys.push(key?);
            if keys.len() >= batch_size {
                delete_keys(&tx, schema, &keys)?;
                outcome.records_deleted += keys.len() as u64;
                keys.clear();
            }
        }
        if !keys.is_empty() {
            delete_keys(&tx, schema, &keys)?;
            outcome.records_deleted += keys.len() as u64;
        }
        if outcome.records_deleted > 0 {
            info!("(delete done) records deleted: {}", outcome.records_deleted);
        }

        if let Some(name) = source {
            runlog::record_applied_on(&tx, name)?;
        }
        tx.commit()?;
        Ok(outcome)
    }
}

/// Upserts one batch: delete every key of the batch from every table, then
/// insert the batch's rows, main table first so dependent rows always have
/// their parent.
fn write_batch(
    conn: &Connection,
    schema: &RecordSchema,
    batch: &[LogicalRecord],
) -> Result<(), StoreError> {
    let keys: Vec<&str> = batch.iter().map(|r| r.key.as_str()).collect();
    delete_rows(conn, schema, &keys)?;

    let main_sql = insert_main_sql(schema);
    let key_column = schema.key_column();
    let mut main_stmt = conn.prepare_cached(&main_sql)?;
    for record in batch {
        main_stmt.execute(params_from_iter(record.main.iter().map(sql_value)))?;
        for (table, values) in &record.foreign {
            let sql = format!("INSERT INTO {table} ({key_column}, value) VALUES (?1, ?2)");
            let mut stmt = conn.prepare_cached(&sql)?;
            for value in values {
                stmt.execute(params![record.key, value])?;
            }
        }
    }
    Ok(())
}

/// Removes every row for `keys` from the main table and each dependent
/// table.
fn delete_keys(
    conn: &Connection,
    schema: &RecordSchema,
    keys: &[String],
) -> Result<(), StoreError> {
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    delete_rows(conn, schema, &refs)
}

fn delete_rows(conn: &Connection, schema: &RecordSchema, keys: &[&str]) -> Result<(), StoreError> {
    if keys.is_empty() {
        return Ok(());
    }
    let placeholders = vec!["?"; keys.len()].join(",");
    let key_column = schema.key_column();
    for table in schema.tables() {
        let sql = format!("DELETE FROM {table} WHERE {key_column} IN ({placeholders})");
        let mut stmt = conn.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(keys.iter().copied()))?;
    }
    Ok(())
}

fn insert_main_sql(schema: &RecordSchema) -> String {
    let columns: Vec<&str> = schema.columns().iter().map(|c| c.name).collect();
    let placeholders = vec!["?"; columns.len()].join(",");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.main_table(),
        columns.join(","),
        placeholders
    )
}

/// rusqlite value for one scalar. Lives here rather than on [`Scalar`] to
/// keep the schema crate free of database types.
fn sql_value(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Text(s) => Value::Text(s.clone()),
        Scalar::Int(n) => Value::Integer(*n),
        Scalar::Null => Value::Null,
    }
}
