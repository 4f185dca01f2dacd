//! The bulk-seed collaborator seam.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Loads per-table tab-separated files into an empty store.
///
/// The mechanism (an `.import` script, a `LOAD DATA` pipeline, whatever
/// the deployment has) belongs to the operator; this trait is only the
/// hand-off point. Loading is all-or-nothing from the caller's side: any
/// error fails the seed run.
pub trait BulkLoader {
    /// `files` maps each destination table to the file holding its rows,
    /// main table included.
    fn load(&mut self, files: &BTreeMap<&'static str, PathBuf>) -> anyhow::Result<()>;
}
