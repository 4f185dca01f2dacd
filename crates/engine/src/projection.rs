//! Projections: rendering feed and store content into comparable files.
//!
//! Both dumps go through the one projection renderer in [`schema`]. That
//! is the whole trick: if the feed side and the store side ever rendered a
//! value differently (an access flag as `allow` here and `1` there, a NULL
//! as `NULL` here and as an empty field there), every affected record
//! would look changed forever and the delta would degenerate into a full
//! rewrite on every run.

use anyhow::{Context, Result};
use feed::{Datafile, FeedError};
use log::warn;
use schema::render_row;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Engine;

/// Per-table bulk-import files dumped from one feed.
#[derive(Debug)]
pub struct FeedDump {
    /// The main-table file; also present in `files`.
    pub main: PathBuf,
    /// Table name → tab-separated file, main table included.
    pub files: BTreeMap<&'static str, PathBuf>,
    /// Physical lines in the feed, parsed or not.
    pub feed_lines: u64,
}

impl Engine {
    /// Parses `feed` and writes one tab-separated file per destination
    /// table into `out_dir`: the full projection for the main table, and
    /// one `key<TAB>value` row per normalized value for each dependent
    /// table. Unparseable lines are logged and skipped; the delta path
    /// never deletes on the strength of a line it could not read.
    pub fn dump_feed(&self, feed: &Path, out_dir: &Path) -> Result<FeedDump> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("creating dump dir {}", out_dir.display()))?;

        let mut files: BTreeMap<&'static str, PathBuf> = BTreeMap::new();
        let main_path = out_dir.join(format!("{}.tsv", self.schema.main_table()));
        files.insert(self.schema.main_table(), main_path.clone());
        let mut main_writer = BufWriter::new(File::create(&main_path)?);

        let mut dependent_writers: BTreeMap<&'static str, BufWriter<File>> = BTreeMap::new();
        for table in self.schema.dependent_tables() {
            let path = out_dir.join(format!("{table}.tsv"));
            dependent_writers.insert(table, BufWriter::new(File::create(&path)?));
            files.insert(table, path);
        }

        let datafile = Datafile::open(feed)?;
        let mut records = datafile.records(&self.schema);
        for item in records.by_ref() {
            match item {
                Ok(record) => {
                    main_writer.write_all(record.projection_line().as_bytes())?;
                    main_writer.write_all(b"\n")?;
                    for (table, values) in &record.foreign {
                        if let Some(writer) = dependent_writers.get_mut(table) {
                            for value in values {
                                writeln!(writer, "{}\t{}", record.key, value)?;
                            }
                        }
                    }
                }
                Err(FeedError::Parse(e)) => warn!("skipping feed line: {e}"),
                Err(FeedError::Io(e)) => {
                    return Err(e).with_context(|| format!("reading {}", feed.display()))
                }
            }
        }
        let feed_lines = records.lines_read();

        main_writer.flush()?;
        for writer in dependent_writers.values_mut() {
            writer.flush()?;
        }

        Ok(FeedDump {
            main: main_path,
            files,
            feed_lines,
        })
    }

    /// Renders every current main-table row into `out`, one projection
    /// line per row, unsorted. Returns the number of rows dumped.
    pub fn dump_store(&self, out: &Path) -> Result<u64> {
        let mut writer =
            BufWriter::new(File::create(out).with_context(|| format!("creating {}", out.display()))?);
        let rows = self.store.scan_main(&self.schema, |row| {
            writer.write_all(render_row(row).as_bytes())?;
            writer.write_all(b"\n")
        })?;
        writer.flush()?;
        Ok(rows)
    }
}
