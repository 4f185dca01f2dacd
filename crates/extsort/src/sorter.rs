use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::merge::RunMerge;

/// Default in-memory run budget, in bytes of buffered line data.
pub const DEFAULT_RUN_BYTES: usize = 256 * 1024 * 1024;

/// Bounded-memory sort for line-oriented files.
///
/// Lines accumulate in memory up to the run budget, get sorted and spilled
/// to a numbered run file in a scratch subdirectory, and the runs are merged
/// into the output in one streaming pass. Inputs that fit in a single run
/// skip the merge entirely and move into place.
///
/// Ordering is plain byte order of the UTF-8 lines, so results are
/// deterministic regardless of locale.
pub struct ExternalSorter {
    scratch_dir: PathBuf,
    max_run_bytes: usize,
}

impl ExternalSorter {
    pub fn new<P: AsRef<Path>>(scratch_dir: P) -> Self {
        Self {
            scratch_dir: scratch_dir.as_ref().to_path_buf(),
            max_run_bytes: DEFAULT_RUN_BYTES,
        }
    }

    /// Overrides the run budget. Tests use a tiny budget to force real
    /// multi-run merges out of small fixtures.
    pub fn with_max_run_bytes(mut self, max_run_bytes: usize) -> Self {
        self.max_run_bytes = max_run_bytes.max(1);
        self
    }

    /// Sorts `lines` into the file at `out`, one line per row, ascending
    /// byte order. Returns the number of lines written.
    pub fn sort_into<I>(&self, lines: I, out: &Path) -> Result<u64>
    where
        I: IntoIterator<Item = String>,
    {
        self.sort_results(lines.into_iter().map(Ok), out)
    }

    /// Sorts an existing line-oriented file into `out`.
    pub fn sort_file_into(&self, input: &Path, out: &Path) -> Result<u64> {
        let reader = open_lines(input)?;
        self.sort_results(reader, out)
    }

    /// Extracts the first tab-separated field of every line of `input` and
    /// writes the fields to `out`, sorted. The id files the delta
    /// classification runs on are produced this way.
    pub fn cut_keys_into(&self, input: &Path, out: &Path) -> Result<u64> {
        let keys = open_lines(input)?.map(|line| {
            line.map(|l| l.split('\t').next().unwrap_or("").to_string())
        });
        self.sort_results(keys, out)
    }

    fn sort_results<I>(&self, lines: I, out: &Path) -> Result<u64>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        std::fs::create_dir_all(&self.scratch_dir)
            .with_context(|| format!("creating scratch dir {}", self.scratch_dir.display()))?;
        let run_dir = tempfile::Builder::new()
            .prefix("sort-")
            .tempdir_in(&self.scratch_dir)?;

        let mut runs: Vec<PathBuf> = Vec::new();
        let mut buffer: Vec<String> = Vec::new();
        let mut buffered_bytes = 0usize;
        let mut total = 0u64;

        for line in lines {
            let line = line?;
            total += 1;
            buffered_bytes += line.len();
            buffer.push(line);
            if buffered_bytes >= self.max_run_bytes {
                runs.push(spill_run(run_dir.path(), runs.len(), &mut buffer)?);
                buffered_bytes = 0;
            }
        }
        if !buffer.is_empty() {
            runs.push(spill_run(run_dir.path(), runs.len(), &mut buffer)?);
        }

        match runs.len() {
            // An empty input sorts to an empty file.
            0 => {
                File::create(out).with_context(|| format!("creating {}", out.display()))?;
            }
            // A single run is already sorted; move it into place. Rename
            // fails across filesystems, so fall back to a copy.
            1 => {
                if std::fs::rename(&runs[0], out).is_err() {
                    std::fs::copy(&runs[0], out)
                        .with_context(|| format!("copying run into {}", out.display()))?;
                }
            }
            _ => {
                let mut merge = RunMerge::open(&runs)?;
                let mut writer = BufWriter::new(
                    File::create(out).with_context(|| format!("creating {}", out.display()))?,
                );
                while let Some(line) = merge.next_line()? {
                    writer.write_all(line.as_bytes())?;
                    writer.write_all(b"\n")?;
                }
                writer.flush()?;
            }
        }
        Ok(total)
    }
}

/// Sorts the buffered lines and writes them out as one numbered run file.
fn spill_run(dir: &Path, index: usize, buffer: &mut Vec<String>) -> Result<PathBuf> {
    buffer.sort_unstable();
    let path = dir.join(format!("run-{index:06}"));
    let mut writer = BufWriter::new(File::create(&path)?);
    for line in buffer.iter() {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    buffer.clear();
    Ok(path)
}

fn open_lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file).lines())
}
