//! # Schema - hathifile record schema
//!
//! Column specifications, value transforms, and line parsing for the
//! tab-delimited hathifile feeds.
//!
//! A feed line is 26 tab-separated fields. Most fields land as a single
//! value in the main table (`hf`); the identifier fields (source bib
//! numbers, OCLC, ISBN, ISSN, LCCN) are comma-separated sets that fan out
//! into one dependent table each, keyed back to the record by `htid`:
//!
//! ```text
//! htid \t access \t rights_code \t bib_num \t description \t source \t
//! source_bib_num \t oclc \t isbn \t issn \t lccn \t title \t imprint \t
//! rights_reason \t rights_timestamp \t us_gov_doc_flag \t rights_date_used \t
//! pub_place \t lang_code \t bib_fmt \t collection_code \t
//! content_provider_code \t responsible_entity_code \t
//! digitization_agent_code \t access_profile_code \t author
//! ```
//!
//! The schema itself is plain data: an ordered list of [`ColumnSpec`]s, each
//! naming its destination table and one member of the closed [`Transform`]
//! set. Parsing a line yields a [`LogicalRecord`] whose main values render
//! back to a projection line via a single code path, so a record that did
//! not change produces byte-identical lines whether it came from a feed or
//! from the store.
//!
//! ## Example
//!
//! ```rust
//! use schema::RecordSchema;
//!
//! let schema = RecordSchema::hathifile();
//! let line = "test.001\tallow\tpd\t1\t\t\t\t\t\t\t\t\t\t\t\t0\t1990\t\t\t\t\t\t\t\t\t";
//! let record = schema.parse(line).unwrap().unwrap();
//! assert_eq!(record.key, "test.001");
//! assert_eq!(record.projection_line().split('\t').count(), 26);
//! ```

mod columns;
mod normalize;
mod record;

pub use columns::{ColumnSpec, RecordSchema, Transform, MAIN_TABLE};
pub use normalize::NUMERIC_SENTINEL;
pub use record::{render_row, LogicalRecord, Scalar};

use thiserror::Error;

/// Errors raised while turning a raw feed line into a [`LogicalRecord`].
///
/// Both variants are recoverable at the scope of a single line: callers are
/// expected to log the error, skip the line, and keep processing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The line did not split into the expected number of tab-separated
    /// fields.
    #[error("record {key:?}: expected {expected} columns, got {actual}")]
    WrongColumnCount {
        /// First field of the offending line, best-effort.
        key: String,
        actual: usize,
        expected: usize,
    },

    /// A field failed its column transform and the transform has no
    /// sentinel fallback.
    #[error("record {key:?}: column {column}: {detail}")]
    Normalization {
        key: String,
        column: &'static str,
        detail: String,
    },
}
