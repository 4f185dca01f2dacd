//! The run log: which feed files have been applied, and when.
//!
//! One row per file in `hf_log (hathifile, applied_at)`. Re-applying a
//! file refreshes its timestamp instead of growing the table, so the log
//! stays a set of names with a last-applied time attached.

use chrono::Local;
use rusqlite::{params, Connection};

use crate::{Store, StoreError};

impl Store {
    /// True when `name` is in the run log.
    pub fn is_applied(&self, name: &str) -> Result<bool, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM hf_log WHERE hathifile = ?1 LIMIT 1")?;
        Ok(stmt.exists(params![name])?)
    }

    /// Records `name` as applied now.
    pub fn record_applied(&self, name: &str) -> Result<(), StoreError> {
        record_applied_on(&self.conn, name)
    }

    /// Every applied file name, in no particular order.
    pub fn applied_files(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare_cached("SELECT hathifile FROM hf_log")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for name in rows {
            names.push(name?);
        }
        Ok(names)
    }
}

/// Update-then-insert keyed on the file name. Free function over a
/// connection so the writer can log inside its transaction; the entry then
/// commits or rolls back together with the rows it describes.
pub(crate) fn record_applied_on(conn: &Connection, name: &str) -> Result<(), StoreError> {
    let applied_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let updated = conn.execute(
        "UPDATE hf_log SET applied_at = ?2 WHERE hathifile = ?1",
        params![name, applied_at],
    )?;
    if updated == 0 {
        conn.execute(
            "INSERT INTO hf_log (hathifile, applied_at) VALUES (?1, ?2)",
            params![name, applied_at],
        )?;
    }
    Ok(())
}
