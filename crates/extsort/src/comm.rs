use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

/// Where each class of line goes. A `None` sink discards that class; the
/// counts are kept either way.
#[derive(Debug, Default)]
pub struct CommOutput<'a> {
    /// Lines present only in the left file.
    pub left_only: Option<&'a Path>,
    /// Lines present only in the right file.
    pub right_only: Option<&'a Path>,
    /// Lines present in both files.
    pub common: Option<&'a Path>,
}

/// Per-class line counts from one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommCounts {
    pub left_only: u64,
    pub right_only: u64,
    pub common: u64,
}

/// Classifies two sorted files line by line, `comm(1)` style.
///
/// Walks both inputs in lockstep and routes every line to exactly one of
/// three classes: only in `left`, only in `right`, or common to both.
/// Duplicate lines pair one-to-one, so a line occurring twice on the left
/// and once on the right contributes one common line and one left-only
/// line.
///
/// Both inputs must already be in ascending byte order; feeding unsorted
/// files produces garbage classifications, not an error.
pub fn comm_sorted(left: &Path, right: &Path, out: CommOutput) -> Result<CommCounts> {
    let mut left_lines = open_lines(left)?;
    let mut right_lines = open_lines(right)?;
    let mut left_sink = Sink::create(out.left_only)?;
    let mut right_sink = Sink::create(out.right_only)?;
    let mut common_sink = Sink::create(out.common)?;
    let mut counts = CommCounts::default();

    let mut a = read_line(&mut left_lines)?;
    let mut b = read_line(&mut right_lines)?;
    loop {
        match (a, b) {
            (None, None) => break,
            (Some(x), None) => {
                counts.left_only += 1;
                left_sink.put(&x)?;
                a = read_line(&mut left_lines)?;
                b = None;
            }
            (None, Some(y)) => {
                counts.right_only += 1;
                right_sink.put(&y)?;
                a = None;
                b = read_line(&mut right_lines)?;
            }
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Less => {
                    counts.left_only += 1;
                    left_sink.put(&x)?;
                    a = read_line(&mut left_lines)?;
                    b = Some(y);
                }
                Ordering::Greater => {
                    counts.right_only += 1;
                    right_sink.put(&y)?;
                    a = Some(x);
                    b = read_line(&mut right_lines)?;
                }
                Ordering::Equal => {
                    counts.common += 1;
                    common_sink.put(&x)?;
                    a = read_line(&mut left_lines)?;
                    b = read_line(&mut right_lines)?;
                }
            },
        }
    }

    left_sink.finish()?;
    right_sink.finish()?;
    common_sink.finish()?;
    Ok(counts)
}

/// A class sink that swallows lines when no output path was requested.
struct Sink(Option<BufWriter<File>>);

impl Sink {
    fn create(path: Option<&Path>) -> Result<Self> {
        let writer = match path {
            Some(p) => Some(BufWriter::new(
                File::create(p).with_context(|| format!("creating {}", p.display()))?,
            )),
            None => None,
        };
        Ok(Self(writer))
    }

    fn put(&mut self, line: &str) -> Result<()> {
        if let Some(writer) = &mut self.0 {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        if let Some(writer) = &mut self.0 {
            writer.flush()?;
        }
        Ok(())
    }
}

fn open_lines(path: &Path) -> Result<Lines<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file).lines())
}

fn read_line(lines: &mut Lines<BufReader<File>>) -> Result<Option<String>> {
    Ok(lines.next().transpose()?)
}
