//! Column specifications and line parsing.
//!
//! [`RecordSchema::hathifile`] is the one schema the system ships: the
//! 26 columns of the hathifile feeds, in feed order. The parser lives here
//! because everything it does is driven by the column list.

use std::collections::BTreeMap;

use crate::normalize;
use crate::record::{LogicalRecord, Scalar};
use crate::ParseError;

/// Name of the main table every scalar value lands in.
pub const MAIN_TABLE: &str = "hf";

/// How a raw field value becomes a stored value.
///
/// This is a closed set on purpose: the schema is plain data, and every
/// transform a column can name is listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Store the field text as-is.
    Identity,
    /// Base-10 integer; unparseable values become [`crate::NUMERIC_SENTINEL`].
    IntWithFallback,
    /// `"allow"` and `"1"` map to 1, anything else to 0.
    AllowFlag,
    /// Valid ISBNs expand to their 10- and 13-digit forms; invalid ones are
    /// dropped.
    Isbn,
    /// Valid ISSNs normalize to the 8-character form; invalid ones are
    /// dropped.
    Issn,
    /// The raw token is always kept; the canonical LC form is added when it
    /// validates.
    Lccn,
    /// Empty becomes null; anything else must parse as a date or datetime
    /// and renders as `%Y-%m-%d %H:%M:%S`.
    Timestamp,
}

/// One column of the feed: its name, destination table, transform, and
/// whether the raw field carries a comma-separated set of values.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// [`MAIN_TABLE`] for scalar columns, a dependent table otherwise.
    pub table: &'static str,
    pub transform: Transform,
    pub multi_valued: bool,
}

impl ColumnSpec {
    /// A single-valued column stored in the main table.
    pub const fn scalar(name: &'static str, transform: Transform) -> Self {
        Self {
            name,
            table: MAIN_TABLE,
            transform,
            multi_valued: false,
        }
    }

    /// A multi-valued column stored one row per value in `table`.
    pub const fn multi(name: &'static str, table: &'static str, transform: Transform) -> Self {
        Self {
            name,
            table,
            transform,
            multi_valued: true,
        }
    }
}

/// An ordered, immutable column list describing one feed format.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    columns: Vec<ColumnSpec>,
}

impl RecordSchema {
    /// Builds a schema from an explicit column list.
    ///
    /// Multi-valued columns must target a dependent table, never
    /// [`MAIN_TABLE`]; every multi-valued column still contributes one
    /// joined copy of its value set to the main table.
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        debug_assert!(!columns.is_empty());
        debug_assert!(columns
            .iter()
            .all(|c| !c.multi_valued || c.table != MAIN_TABLE));
        Self { columns }
    }

    /// The 26-column hathifile schema, ordered as the feed is.
    pub fn hathifile() -> Self {
        use Transform::*;
        Self::new(vec![
            ColumnSpec::scalar("htid", Identity),
            ColumnSpec::scalar("access", AllowFlag),
            ColumnSpec::scalar("rights_code", Identity),
            ColumnSpec::scalar("bib_num", IntWithFallback),
            ColumnSpec::scalar("description", Identity),
            ColumnSpec::scalar("source", Identity),
            ColumnSpec::multi("source_bib_num", "hf_source_bib", Identity),
            ColumnSpec::multi("oclc", "hf_oclc", IntWithFallback),
            ColumnSpec::multi("isbn", "hf_isbn", Isbn),
            ColumnSpec::multi("issn", "hf_issn", Issn),
            ColumnSpec::multi("lccn", "hf_lccn", Lccn),
            ColumnSpec::scalar("title", Identity),
            ColumnSpec::scalar("imprint", Identity),
            ColumnSpec::scalar("rights_reason", Identity),
            ColumnSpec::scalar("rights_timestamp", Timestamp),
            ColumnSpec::scalar("us_gov_doc_flag", IntWithFallback),
            ColumnSpec::scalar("rights_date_used", IntWithFallback),
            ColumnSpec::scalar("pub_place", Identity),
            ColumnSpec::scalar("lang_code", Identity),
            ColumnSpec::scalar("bib_fmt", Identity),
            ColumnSpec::scalar("collection_code", Identity),
            ColumnSpec::scalar("content_provider_code", Identity),
            ColumnSpec::scalar("responsible_entity_code", Identity),
            ColumnSpec::scalar("digitization_agent_code", Identity),
            ColumnSpec::scalar("access_profile_code", Identity),
            ColumnSpec::scalar("author", Identity),
        ])
    }

    /// Number of tab-separated fields a well-formed line must have.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The column list, in feed order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Name of the main table.
    pub fn main_table(&self) -> &'static str {
        MAIN_TABLE
    }

    /// Name of the key column. The first column is the key by
    /// construction; it identifies a record in the main table and every
    /// dependent table.
    pub fn key_column(&self) -> &'static str {
        self.columns[0].name
    }

    /// Every destination table: main first, then dependents in
    /// first-appearance order.
    pub fn tables(&self) -> Vec<&'static str> {
        let mut tables = vec![self.main_table()];
        for col in &self.columns {
            if col.multi_valued && !tables.contains(&col.table) {
                tables.push(col.table);
            }
        }
        tables
    }

    /// The dependent tables only, in first-appearance order.
    pub fn dependent_tables(&self) -> Vec<&'static str> {
        self.tables().split_off(1)
    }

    /// Parses one raw feed line into a [`LogicalRecord`].
    ///
    /// Returns `Ok(None)` for lines that carry no record: wholly blank
    /// lines, and lines whose key (first) field is empty. A trailing
    /// newline, with or without a carriage return, is ignored.
    ///
    /// # Errors
    ///
    /// * [`ParseError::WrongColumnCount`] when the field count is off, with
    ///   one tolerated exception described below.
    /// * [`ParseError::Normalization`] when a field defeats its transform
    ///   (in this schema: a non-empty `rights_timestamp` in no recognized
    ///   format).
    pub fn parse(&self, raw_line: &str) -> Result<Option<LogicalRecord>, ParseError> {
        let line = raw_line.strip_suffix('\n').unwrap_or(raw_line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            return Ok(None);
        }

        let mut fields: Vec<&str> = line.split('\t').collect();

        // Feeds sometimes end a record after the 25th field when the author
        // is absent, with no trailing separator. Pad exactly that case: one
        // field short and the last present field has real content. Whether
        // a one-short line with a blank tail deserves the same pardon is
        // unsettled; this keeps the historical reading.
        if fields.len() + 1 == self.column_count()
            && fields.last().is_some_and(|f| !f.trim().is_empty())
        {
            fields.push("");
        }

        if fields.len() != self.column_count() {
            return Err(ParseError::WrongColumnCount {
                key: fields.first().copied().unwrap_or_default().to_string(),
                actual: fields.len(),
                expected: self.column_count(),
            });
        }

        let key = fields[0].to_string();
        if key.is_empty() {
            return Ok(None);
        }

        let mut main = Vec::with_capacity(self.column_count());
        let mut foreign: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for (spec, raw) in self.columns.iter().zip(fields.iter().copied()) {
            if spec.multi_valued {
                let values = transform_set(spec, raw).map_err(|detail| err(&key, spec, detail))?;
                main.push(Scalar::Text(values.join(",")));
                foreign.insert(spec.table, values);
            } else {
                main.push(transform_scalar(spec, raw).map_err(|detail| err(&key, spec, detail))?);
            }
        }

        Ok(Some(LogicalRecord { key, main, foreign }))
    }
}

fn err(key: &str, spec: &ColumnSpec, detail: String) -> ParseError {
    ParseError::Normalization {
        key: key.to_string(),
        column: spec.name,
        detail,
    }
}

/// Applies a scalar column's transform to one raw field.
fn transform_scalar(spec: &ColumnSpec, raw: &str) -> Result<Scalar, String> {
    Ok(match spec.transform {
        Transform::Identity => Scalar::Text(raw.to_string()),
        Transform::IntWithFallback => Scalar::Int(normalize::int_with_fallback(raw)),
        Transform::AllowFlag => Scalar::Int(normalize::allow_flag(raw)),
        Transform::Timestamp => match normalize::canonical_timestamp(raw)? {
            Some(ts) => Scalar::Text(ts),
            None => Scalar::Null,
        },
        // The identifier transforms only appear on multi-valued columns in
        // the hathifile schema; on a scalar column they collapse to the
        // joined value set.
        Transform::Isbn | Transform::Issn | Transform::Lccn => {
            Scalar::Text(transform_set(spec, raw)?.join(","))
        }
    })
}

/// Applies a multi-valued column's transform to one raw field.
///
/// The field is split on commas (whitespace around each chunk trimmed),
/// every chunk runs through the transform, and the flattened results are
/// deduplicated in first-seen order with empties dropped. Re-running the
/// pipeline over a joined result is a fixed point, which is what makes
/// projection lines safe to re-parse.
fn transform_set(spec: &ColumnSpec, raw: &str) -> Result<Vec<String>, String> {
    let mut values: Vec<String> = Vec::new();
    for chunk in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        expand_chunk(spec.transform, chunk, &mut values)?;
    }
    let mut seen: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !v.is_empty() && !seen.contains(&v) {
            seen.push(v);
        }
    }
    Ok(seen)
}

/// Expands one comma-separated chunk into zero or more stored values.
fn expand_chunk(transform: Transform, chunk: &str, out: &mut Vec<String>) -> Result<(), String> {
    match transform {
        Transform::Identity => out.push(chunk.to_string()),
        Transform::IntWithFallback => out.push(normalize::int_with_fallback(chunk).to_string()),
        Transform::AllowFlag => out.push(normalize::allow_flag(chunk).to_string()),
        Transform::Isbn => {
            for token in subtokens(chunk) {
                out.extend(normalize::isbn_normalized_values(token));
            }
        }
        Transform::Issn => {
            for token in subtokens(chunk) {
                out.extend(normalize::issn_normalized(token));
            }
        }
        Transform::Lccn => {
            out.push(chunk.to_string());
            out.extend(normalize::lccn_normalized(chunk));
        }
        Transform::Timestamp => {
            if let Some(ts) = normalize::canonical_timestamp(chunk)? {
                out.push(ts);
            }
        }
    }
    Ok(())
}

/// ISBN and ISSN fields pack several identifiers into one chunk more often
/// than the other columns do; split again on the usual separators.
fn subtokens(chunk: &str) -> impl Iterator<Item = &str> {
    chunk
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';' || c == '|')
        .filter(|t| !t.is_empty())
}
