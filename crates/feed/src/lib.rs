//! # Feed - hathifile feeds on disk
//!
//! A feed is one tab-delimited file of bibliographic records, full
//! (`hathi_full_YYYYMMDD.txt.gz`, a complete snapshot) or incremental
//! (`hathi_upd_YYYYMMDD.txt.gz`, new and changed records only). This crate
//! handles everything about those files short of interpreting the records:
//!
//! - [`Datafile`] opens a feed whether or not it is actually
//!   gzip-compressed and hands out a lazy [`Records`] iterator.
//! - [`FeedName`] gives the naming convention a type, so full/incremental
//!   dispatch and date ordering never re-parse file names ad hoc.
//! - [`pending`] decides which files in a directory a store still needs,
//!   given its run log.

mod detector;

pub use detector::{pending, Pending};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use flate2::read::GzDecoder;
use schema::{LogicalRecord, ParseError, RecordSchema};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// One failed item of a feed scan.
///
/// The two variants draw the recoverability line: a parse failure spoils
/// one line and the scan continues, while an I/O failure spoils the stream
/// itself and ends the run.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Recoverable. Log it, skip the line, keep reading.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Fatal. The underlying stream failed (truncated gzip, disk error).
    #[error("reading feed: {0}")]
    Io(#[from] std::io::Error),
}

/// A feed file opened for reading, gzip-compressed or not.
///
/// Compression is sniffed from the two-byte gzip magic number rather than
/// the file name: naming convention and actual encoding drift apart in
/// practice (hand-decompressed files, test fixtures), and the bytes do not
/// lie.
pub struct Datafile {
    path: PathBuf,
    reader: Box<dyn BufRead>,
}

impl Datafile {
    /// Opens the feed at `path`, decoding gzip transparently.
    ///
    /// A missing or unreadable file is a hard error; there is no useful
    /// way to continue a run without its feed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file =
            File::open(&path).with_context(|| format!("opening feed {}", path.display()))?;
        let mut plain = BufReader::new(file);
        let gzipped = plain.fill_buf()?.starts_with(GZIP_MAGIC);
        let reader: Box<dyn BufRead> = if gzipped {
            Box::new(BufReader::new(GzDecoder::new(plain)))
        } else {
            Box::new(plain)
        };
        Ok(Self { path, reader })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consumes the datafile into a lazy record iterator.
    pub fn records(self, schema: &RecordSchema) -> Records<'_> {
        Records::from_reader(self.reader, schema)
    }
}

/// Lazy iterator over the records of one feed.
///
/// Lines that carry no record at all (blank lines, lines with an empty
/// key field) are skipped silently. Parse failures come through as items
/// so each consumer can isolate them at its own scope; an I/O failure
/// comes through once and ends the iteration.
pub struct Records<'a> {
    schema: &'a RecordSchema,
    lines: std::io::Lines<Box<dyn BufRead>>,
    lines_read: u64,
    done: bool,
}

impl<'a> Records<'a> {
    /// Wraps any line source. The delta path uses this to re-parse its
    /// own derivative files, which are plain uncompressed projections.
    pub fn from_reader(reader: Box<dyn BufRead>, schema: &'a RecordSchema) -> Self {
        Self {
            schema,
            lines: reader.lines(),
            lines_read: 0,
            done: false,
        }
    }

    /// Physical lines consumed so far, parsed or not. The run statistics
    /// report this as the feed line count.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }
}

impl Iterator for Records<'_> {
    type Item = Result<LogicalRecord, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            self.lines_read += 1;
            match self.schema.parse(&line) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Kind of feed a file name announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// A complete snapshot; records absent from it are deletions.
    Full,
    /// A partial feed of new and changed records; absence means nothing.
    Update,
}

/// A parsed feed file name: `hathi_full_YYYYMMDD.txt.gz` or
/// `hathi_upd_YYYYMMDD.txt.gz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedName {
    pub kind: FeedKind,
    pub date: NaiveDate,
    name: String,
}

impl FeedName {
    /// Parses a file name (not a path). Returns `None` for anything that
    /// does not match the convention exactly, including an embedded date
    /// that is not a real calendar date.
    pub fn parse(name: &str) -> Option<FeedName> {
        let rest = name.strip_prefix("hathi_")?;
        let (kind, rest) = if let Some(r) = rest.strip_prefix("full_") {
            (FeedKind::Full, r)
        } else if let Some(r) = rest.strip_prefix("upd_") {
            (FeedKind::Update, r)
        } else {
            return None;
        };
        let digits = rest.strip_suffix(".txt.gz")?;
        if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let date = NaiveDate::parse_from_str(digits, "%Y%m%d").ok()?;
        Some(FeedName {
            kind,
            date,
            name: name.to_string(),
        })
    }

    /// The kind announced by the file name of `path`, if it parses.
    pub fn kind_of_path(path: &Path) -> Option<FeedKind> {
        let name = path.file_name()?.to_str()?;
        Some(Self::parse(name)?.kind)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_name(self) -> String {
        self.name
    }
}
