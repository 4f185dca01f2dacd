//! # Store - the hathifiles relational store
//!
//! SQLite-backed storage for the main bibliographic table and its
//! dependent identifier tables, one row per normalized value. The crate
//! deliberately owns no DDL: creating and migrating the data tables is an
//! operator concern, and tests build their own fixture schema. What lives
//! here is everything that touches rows:
//!
//! - the batched, transactional delete-then-insert writer ([`Store::apply`]),
//! - the run log of applied feed files ([`Store::is_applied`] and friends),
//! - the streaming main-table scan the store projection is rendered from
//!   ([`Store::scan_main`]),
//! - the [`BulkLoader`] seam the bulk-seed path hands its files to.
//!
//! Every error that reaches a caller is fatal for the current run; the
//! recoverable failures (single bad feed lines) are consumed inside
//! [`Store::apply`] and only show up in its outcome counts and the log.

mod bulk;
mod runlog;
mod scan;
mod writer;

pub use bulk::BulkLoader;
pub use writer::{ApplyOutcome, DEFAULT_BATCH_SIZE};

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A connection to the store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (or creates) the SQLite database at `path` with foreign-key
    /// enforcement on.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_raw(Connection::open(path)?)
    }

    /// Opens a private in-memory store. Tests use this; production always
    /// opens a file.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_raw(Connection::open_in_memory()?)
    }

    fn from_raw(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// The underlying connection, for schema setup and ad hoc queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Toggles foreign-key enforcement. Turned off only around the
    /// bulk-seed path; every incremental run needs it back on.
    pub fn set_foreign_key_checks(&self, on: bool) -> Result<(), StoreError> {
        let pragma = if on {
            "PRAGMA foreign_keys = ON;"
        } else {
            "PRAGMA foreign_keys = OFF;"
        };
        self.conn.execute_batch(pragma)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
