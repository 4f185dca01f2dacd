//! Logical records and projection rendering.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A single typed value bound for one main-table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Null,
}

impl Scalar {
    /// Appends the projection rendering of this value to `out`. `Null`
    /// renders as the empty string, so every projection line has exactly
    /// one field per column.
    pub fn render_into(&self, out: &mut String) {
        match self {
            Scalar::Text(s) => out.push_str(s),
            Scalar::Int(n) => {
                // write! to a String cannot fail
                let _ = write!(out, "{n}");
            }
            Scalar::Null => {}
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

/// Renders one row of main-table values as a tab-joined projection line.
///
/// This is the only line rendering in the system. Feed-side dumps call it
/// through [`LogicalRecord::projection_line`]; store-side dumps call it
/// with rows read back from the main table. One code path is what makes
/// unchanged records byte-identical on both sides of a delta.
pub fn render_row(values: &[Scalar]) -> String {
    let mut out = String::with_capacity(128);
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push('\t');
        }
        value.render_into(&mut out);
    }
    out
}

/// One parsed feed line: the record key plus every value it contributes to
/// the main table and the dependent tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRecord {
    /// First field of the line; the primary identifier everywhere.
    pub key: String,
    /// One value per schema column, in schema order. Multi-valued columns
    /// contribute their comma-joined value set here.
    pub main: Vec<Scalar>,
    /// Per dependent table: the normalized value set, deduplicated in
    /// first-seen order with empties dropped.
    pub foreign: BTreeMap<&'static str, Vec<String>>,
}

impl LogicalRecord {
    /// Renders the main-table values as one projection line.
    pub fn projection_line(&self) -> String {
        render_row(&self.main)
    }
}
