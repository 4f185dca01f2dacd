//! Runs: delta-and-apply, straight apply, bulk seed, pending files.

use anyhow::{Context, Result};
use feed::Datafile;
use log::info;
use std::collections::HashSet;
use std::path::Path;
use store::{ApplyOutcome, BulkLoader};

use crate::delta::feed_file_name;
use crate::{Engine, Statistics};

impl Engine {
    /// Synchronizes the store with `feed`: computes the delta, applies the
    /// changed records and (for full feeds) the deletions in one
    /// transaction, and records the feed in the run log. Returns the run
    /// statistics.
    pub fn sync_file(&mut self, feed: &Path) -> Result<Statistics> {
        let name = feed_file_name(feed)?;
        let delta = self.compute_delta(feed)?;
        info!("applying delta for {name}");
        let records = delta.records(&self.schema)?;
        let deletes = delta.delete_keys()?;
        self.store
            .apply(&self.schema, records, deletes, Some(&name), self.batch_size)?;
        Ok(delta.statistics())
    }

    /// Applies every record of `feed` without computing a delta: the
    /// brute-force path that delete-then-inserts each record whether it
    /// changed or not. Never deletes anything. Still records the feed in
    /// the run log.
    pub fn apply_file(&mut self, feed: &Path) -> Result<ApplyOutcome> {
        let name = feed_file_name(feed)?;
        info!("applying {name} without a delta");
        let records = Datafile::open(feed)?.records(&self.schema);
        let outcome = self.store.apply(
            &self.schema,
            records,
            std::iter::empty::<std::io::Result<String>>(),
            Some(&name),
            self.batch_size,
        )?;
        Ok(outcome)
    }

    /// Seeds an empty store from a feed through the external bulk loader:
    /// dump the per-table files, hand them over with foreign-key checks
    /// off, then re-enable the checks whatever happened.
    ///
    /// Writes no run-log entry. The follow-up `sync_file` of the same
    /// feed verifies the load (its delta is empty when the loader did its
    /// job) and records the file as applied.
    pub fn seed(&mut self, feed: &Path, loader: &mut dyn BulkLoader) -> Result<()> {
        let dump = self.dump_feed(feed, &self.scratch_dir)?;
        info!(
            "bulk loading {} tables ({} feed lines)",
            dump.files.len(),
            dump.feed_lines
        );
        self.store.set_foreign_key_checks(false)?;
        let loaded = loader.load(&dump.files);
        self.store.set_foreign_key_checks(true)?;
        loaded.context("bulk load failed")?;
        Ok(())
    }

    /// File names under `feed_dir` that still need to be applied, in load
    /// order: the newest full file first when unapplied, then the updates
    /// from that date on.
    pub fn pending(&self, feed_dir: &Path) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(feed_dir)
            .with_context(|| format!("listing {}", feed_dir.display()))?
        {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        let applied: HashSet<String> = self.store.applied_files()?.into_iter().collect();
        Ok(feed::pending(names, &applied).into_ordered())
    }
}
