use anyhow::Result;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;

/// A pending line from one run, used for heap-based merge ordering.
struct HeapEntry {
    line: String,
    /// Index into the runs vector this line came from.
    source: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line && self.source == other.source
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse the comparison so the smallest
        // line surfaces first. Ties go to the lower run index, which keeps
        // the merge deterministic.
        other
            .line
            .cmp(&self.line)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Streaming k-way merge over sorted run files.
///
/// Yields every line of every run in ascending byte order. Duplicate lines
/// are emitted as many times as they occur: the classification downstream
/// pairs duplicates one-to-one, so the merge must never collapse them.
pub(crate) struct RunMerge {
    runs: Vec<Lines<BufReader<File>>>,
    heap: BinaryHeap<HeapEntry>,
}

impl RunMerge {
    pub(crate) fn open(paths: &[PathBuf]) -> Result<Self> {
        let mut runs = Vec::with_capacity(paths.len());
        let mut heap = BinaryHeap::new();
        for (source, path) in paths.iter().enumerate() {
            let mut lines = BufReader::new(File::open(path)?).lines();
            if let Some(first) = lines.next() {
                heap.push(HeapEntry {
                    line: first?,
                    source,
                });
            }
            runs.push(lines);
        }
        Ok(Self { runs, heap })
    }

    /// Next line in merged order, or `None` once every run is exhausted.
    pub(crate) fn next_line(&mut self) -> Result<Option<String>> {
        let entry = match self.heap.pop() {
            Some(entry) => entry,
            None => return Ok(None),
        };
        if let Some(next) = self.runs[entry.source].next() {
            self.heap.push(HeapEntry {
                line: next?,
                source: entry.source,
            });
        }
        Ok(Some(entry.line))
    }
}
