//! # Engine - Hathifile Synchronization Engine
//!
//! The central orchestrator that ties together the [`schema`], [`feed`],
//! [`extsort`], and [`store`] crates into a complete feed-to-database
//! synchronization pipeline.
//!
//! ## Architecture
//!
//! ```text
//! feed file (hathi_{full,upd}_YYYYMMDD.txt.gz)
//!   |
//!   v
//! ┌───────────────────────────────────────────────────┐
//! │                    ENGINE                         │
//! │                                                   │
//! │ projection.rs → parse feed  → <feed>.new          │
//! │                 scan store  → hf_current.txt      │
//! │                 (one shared renderer, both sides) │
//! │                   |                               │
//! │                   v                               │
//! │ delta.rs      → sort + classify                   │
//! │                   .all_changes  (upserts)         │
//! │                   .deletions    (full feeds only) │
//! │                   |                               │
//! │                   v                               │
//! │ sync.rs       → one transaction:                  │
//! │                   batched delete-then-insert      │
//! │                   deletion pass                   │
//! │                   run-log entry                   │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module         | Purpose                                            |
//! |----------------|----------------------------------------------------|
//! | `lib.rs`       | `Engine` struct, constructor, accessors            |
//! | [`projection`] | Feed dump to per-table files, store dump           |
//! | [`delta`]      | Derivative files, classification, [`Statistics`]   |
//! | [`sync`]       | `sync_file`, `apply_file`, bulk `seed`, `pending`  |
//!
//! ## The byte-identity rule
//!
//! A record is unchanged exactly when its rendered projection line is
//! byte-identical on the feed side and the store side. Both sides render
//! through the same code path in [`schema`], so the delta never compares
//! fields; it compares whole sorted lines with the two-file classification
//! in [`extsort`]. Everything downstream (what to upsert, what to delete,
//! the run statistics) falls out of that one comparison.

mod delta;
mod projection;
mod sync;

pub use delta::{Delta, Statistics};
pub use projection::FeedDump;
pub use store::BulkLoader;

use schema::RecordSchema;
use std::path::{Path, PathBuf};
use store::Store;

/// The synchronization engine: one store, one schema, one scratch
/// directory for sort spills and delta derivatives.
pub struct Engine {
    store: Store,
    schema: RecordSchema,
    scratch_dir: PathBuf,
    batch_size: usize,
}

impl Engine {
    /// Creates an engine over `store`, keeping its working files under
    /// `scratch_dir`. The directory is created on first use; its contents
    /// are only meaningful within one run.
    pub fn new<P: AsRef<Path>>(store: Store, scratch_dir: P) -> Self {
        Self {
            store,
            schema: RecordSchema::hathifile(),
            scratch_dir: scratch_dir.as_ref().to_path_buf(),
            batch_size: store::DEFAULT_BATCH_SIZE,
        }
    }

    /// Overrides the writer batch size; clamped to at least 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }
}

#[cfg(test)]
mod tests;
