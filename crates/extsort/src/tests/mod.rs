use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

mod comm_tests;

pub(crate) fn write_lines(path: &Path, lines: &[&str]) {
    let mut file = File::create(path).expect("create fixture file");
    for line in lines {
        writeln!(file, "{line}").expect("write fixture line");
    }
}

pub(crate) fn read_lines(path: &Path) -> Vec<String> {
    let file = File::open(path).expect("open output file");
    BufReader::new(file)
        .lines()
        .map(|l| l.expect("read output line"))
        .collect()
}
