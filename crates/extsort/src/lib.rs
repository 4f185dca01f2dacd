//! # Extsort - external sort and sorted-stream classification
//!
//! The delta machinery compares two projections that are far too large to
//! hold in memory at once. This crate provides the two primitives that
//! comparison is built from:
//!
//! - [`ExternalSorter`] sorts arbitrarily large line-oriented files by
//!   spilling bounded in-memory runs to scratch files and merging them in
//!   a single streaming pass.
//! - [`comm_sorted`] classifies two sorted files into left-only,
//!   right-only, and common lines, writing any subset of the classes to
//!   disk and returning the counts of all three.
//!
//! Everything works on whole lines in plain byte order. Two records are
//! "the same" exactly when their rendered lines are byte-identical, which
//! is what lets unchanged records drop out of a delta with no per-field
//! comparison at all.

mod comm;
mod merge;
mod sorter;

pub use comm::{comm_sorted, CommCounts, CommOutput};
pub use sorter::{ExternalSorter, DEFAULT_RUN_BYTES};

#[cfg(test)]
mod tests;
