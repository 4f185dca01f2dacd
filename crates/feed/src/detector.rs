//! Pending-file detection.
//!
//! Given a directory listing and the names already recorded in the run
//! log, decide what a run still has to apply. The most recent full file
//! is the waypoint: updates older than it are dead history no matter what
//! the log says, because the snapshot already contains their effects.

use crate::{FeedKind, FeedName};
use std::collections::HashSet;

/// What a run still has to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    /// The most recent full file, when it has not been applied yet.
    pub full: Option<String>,
    /// Pending updates, ascending by date.
    pub updates: Vec<String>,
}

impl Pending {
    /// Flattens into load order: the full file first, then the updates.
    pub fn into_ordered(self) -> Vec<String> {
        let mut ordered = Vec::with_capacity(self.updates.len() + 1);
        if let Some(full) = self.full {
            ordered.push(full);
        }
        ordered.extend(self.updates);
        ordered
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_none() && self.updates.is_empty()
    }
}

/// Computes the pending files from a listing of file names and the set of
/// names already applied.
///
/// - Names that do not match the feed convention are ignored; feed
///   directories accumulate readmes and half-downloaded junk.
/// - The candidate full file is the most recent by date. It is pending
///   unless applied; at most one full file matters per run.
/// - Updates dated on or after the candidate full's date are candidates.
///   When the full file is applied, the applied updates drop out. When
///   the full file is itself pending, every candidate update is returned,
///   applied or not: they all have to be replayed on top of the snapshot.
/// - With no full file in the listing nothing is pending. Updates are
///   partial feeds and mean nothing without a baseline.
pub fn pending<I, S>(names: I, applied: &HashSet<String>) -> Pending
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut fulls: Vec<FeedName> = Vec::new();
    let mut updates: Vec<FeedName> = Vec::new();
    for name in names {
        match FeedName::parse(name.as_ref()) {
            Some(feed) if feed.kind == FeedKind::Full => fulls.push(feed),
            Some(feed) => updates.push(feed),
            None => {}
        }
    }

    let latest_full = fulls
        .into_iter()
        .max_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name().cmp(b.name())));
    let Some(latest_full) = latest_full else {
        return Pending {
            full: None,
            updates: Vec::new(),
        };
    };

    updates.retain(|u| u.date >= latest_full.date);
    updates.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name().cmp(b.name())));

    let full_applied = applied.contains(latest_full.name());
    if full_applied {
        updates.retain(|u| !applied.contains(u.name()));
    }

    Pending {
        full: (!full_applied).then(|| latest_full.into_name()),
        updates: updates.into_iter().map(FeedName::into_name).collect(),
    }
}
