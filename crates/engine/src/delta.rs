//! Delta computation: classify a feed against the current store state.
//!
//! One run leaves a family of derivative files in the scratch directory,
//! named after the feed:
//!
//! ```text
//! hf_current.txt          sorted projection of the main table
//! hf_current_ids.txt      its keys, sorted
//! <feed>.new              sorted projection of the feed
//! <feed>.new_ids          its keys, sorted
//! <feed>.all_changes      lines only in .new: the records to upsert
//! <feed>.all_changes_ids  their keys, sorted
//! <feed>.additions        keys only in .new
//! <feed>.updates          keys present before whose content changed
//! <feed>.deletions        keys only in hf_current (full feeds only)
//! ```
//!
//! The statistics files (`.additions`, `.updates`) are not re-read by the
//! apply path; they exist so an operator can answer "what did this run
//! touch" with `wc -l` instead of archaeology.

use anyhow::{anyhow, Context, Result};
use extsort::{comm_sorted, CommOutput, ExternalSorter};
use feed::{FeedKind, FeedName, Records};
use log::info;
use schema::RecordSchema;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::Engine;

/// Run statistics, one delta's worth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Keys in the feed that were not in the store.
    pub additions: u64,
    /// Records upserted: new keys plus changed content.
    pub changes: u64,
    /// Keys removed because a full feed no longer carries them.
    pub deletions: u64,
    /// Keys that existed before and whose content changed.
    pub updates: u64,
    /// Physical lines in the feed file.
    pub feed_lines: u64,
}

/// The computed difference between one feed and the store: which
/// projection lines to upsert, and (for full feeds) which keys to delete.
#[derive(Debug)]
pub struct Delta {
    upserts: PathBuf,
    deletions: Option<PathBuf>,
    stats: Statistics,
}

impl Delta {
    /// Lazily re-parses the upsert lines into records. Projection lines
    /// are a fixed point of the parser, so the derivative file needs no
    /// decoder of its own.
    pub fn records<'a>(&self, schema: &'a RecordSchema) -> Result<Records<'a>> {
        let file = File::open(&self.upserts)
            .with_context(|| format!("opening {}", self.upserts.display()))?;
        Ok(Records::from_reader(
            Box::new(BufReader::new(file)),
            schema,
        ))
    }

    /// Streams the keys to delete; empty for incremental feeds.
    pub fn delete_keys(&self) -> Result<Box<dyn Iterator<Item = std::io::Result<String>>>> {
        match &self.deletions {
            Some(path) => {
                let file =
                    File::open(path).with_context(|| format!("opening {}", path.display()))?;
                Ok(Box::new(BufReader::new(file).lines()))
            }
            None => Ok(Box::new(std::iter::empty())),
        }
    }

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    pub fn upserts_path(&self) -> &Path {
        &self.upserts
    }

    pub fn deletions_path(&self) -> Option<&Path> {
        self.deletions.as_deref()
    }
}

impl Engine {
    /// Computes the delta between `feed` and the store.
    ///
    /// Both sides render through the identical projection code and are
    /// sorted, so an unchanged record produces byte-identical lines and
    /// drops out of the classification. Deletions are derived only for
    /// full feeds: an incremental feed is a partial snapshot, and the keys
    /// it omits say nothing. A file name that does not match the feed
    /// convention is treated as incremental for the same reason: an
    /// ambiguous name must never cause deletions. Re-computing against an
    /// already synchronized store yields an empty delta.
    pub fn compute_delta(&self, feed: &Path) -> Result<Delta> {
        std::fs::create_dir_all(&self.scratch_dir)
            .with_context(|| format!("creating scratch dir {}", self.scratch_dir.display()))?;
        let feed_name = feed_file_name(feed)?;
        let kind = FeedName::parse(&feed_name)
            .map(|f| f.kind)
            .unwrap_or(FeedKind::Update);
        let sorter = ExternalSorter::new(&self.scratch_dir);

        // Store side: dump, sort, cut keys.
        let current = self.scratch_dir.join("hf_current.txt");
        let current_ids = self.scratch_dir.join("hf_current_ids.txt");
        let unsorted = self.scratch_dir.join("hf_current.unsorted");
        let rows = self.dump_store(&unsorted)?;
        info!("dumped {rows} current rows, sorting into {}", current.display());
        sorter.sort_file_into(&unsorted, &current)?;
        std::fs::remove_file(&unsorted)?;
        sorter.cut_keys_into(&current, &current_ids)?;

        // Feed side: dump per-table files, sort the main projection, cut
        // keys. The per-table files have served their purpose after this.
        let dump = self.dump_feed(feed, &self.scratch_dir)?;
        let new = self.scratch_dir.join(format!("{feed_name}.new"));
        let new_ids = self.scratch_dir.join(format!("{feed_name}.new_ids"));
        sorter.sort_file_into(&dump.main, &new)?;
        for path in dump.files.values() {
            std::fs::remove_file(path)?;
        }
        sorter.cut_keys_into(&new, &new_ids)?;

        // Content classification: lines only in the feed are the records
        // to upsert. Lines only in the store are stale content, but keys
        // decide deletions, not content.
        let all_changes = derivative(&self.scratch_dir, &feed_name, "all_changes");
        let all_changes_ids = derivative(&self.scratch_dir, &feed_name, "all_changes_ids");
        let content = comm_sorted(
            &current,
            &new,
            CommOutput {
                right_only: Some(&all_changes),
                ..CommOutput::default()
            },
        )?;
        sorter.cut_keys_into(&all_changes, &all_changes_ids)?;

        // Key classification: additions, and (full feeds) deletions.
        let additions = derivative(&self.scratch_dir, &feed_name, "additions");
        let deletions = (kind == FeedKind::Full)
            .then(|| derivative(&self.scratch_dir, &feed_name, "deletions"));
        let keys = comm_sorted(
            &current_ids,
            &new_ids,
            CommOutput {
                left_only: deletions.as_deref(),
                right_only: Some(&additions),
                common: None,
            },
        )?;

        // Changed keys that already existed are updates.
        let updates = derivative(&self.scratch_dir, &feed_name, "updates");
        let overlap = comm_sorted(
            &current_ids,
            &all_changes_ids,
            CommOutput {
                common: Some(&updates),
                ..CommOutput::default()
            },
        )?;

        let stats = Statistics {
            additions: keys.right_only,
            changes: content.right_only,
            deletions: match kind {
                FeedKind::Full => keys.left_only,
                FeedKind::Update => 0,
            },
            updates: overlap.common,
            feed_lines: dump.feed_lines,
        };
        info!(
            "delta for {feed_name}: {} additions, {} changes, {} deletions, {} updates over {} feed lines",
            stats.additions, stats.changes, stats.deletions, stats.updates, stats.feed_lines
        );

        Ok(Delta {
            upserts: all_changes,
            deletions,
            stats,
        })
    }
}

fn derivative(dir: &Path, feed_name: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{feed_name}.{suffix}"))
}

pub(crate) fn feed_file_name(feed: &Path) -> Result<String> {
    feed.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("feed path {} has no usable file name", feed.display()))
}
