use super::helpers::{engine, feed_line, read_lines, write_feed};
use anyhow::Result;
use tempfile::tempdir;

#[test]
fn dump_feed_writes_projection_and_dependent_files() -> Result<()> {
    let dir = tempdir()?;
    let engine = engine(dir.path());
    let feed = dir.path().join("hathi_upd_20240115.txt.gz");
    let lines = vec![feed_line("mdp.001", "First"), feed_line("mdp.002", "Second")];
    write_feed(&feed, &lines);

    let dump = engine.dump_feed(&feed, &dir.path().join("dump"))?;

    assert_eq!(dump.feed_lines, 2);
    let mut tables: Vec<_> = dump.files.keys().copied().collect();
    tables.sort_unstable();
    assert_eq!(
        tables,
        vec!["hf", "hf_isbn", "hf_issn", "hf_lccn", "hf_oclc", "hf_source_bib"]
    );

    // The main file is the projection itself, line for line.
    let schema = engine.schema();
    let expected: Vec<String> = lines
        .iter()
        .map(|l| schema.parse(l).unwrap().unwrap().projection_line())
        .collect();
    assert_eq!(read_lines(&dump.main), expected);

    // Dependent files carry one key/value row per normalized value.
    assert_eq!(
        read_lines(&dump.files["hf_oclc"]),
        vec!["mdp.001\t1172208", "mdp.002\t1172208"]
    );
    let isbn_rows = read_lines(&dump.files["hf_isbn"]);
    assert_eq!(
        isbn_rows,
        vec![
            "mdp.001\t0394404289",
            "mdp.001\t9780394404288",
            "mdp.002\t0394404289",
            "mdp.002\t9780394404288",
        ]
    );
    assert_eq!(
        read_lines(&dump.files["hf_lccn"]),
        vec![
            "mdp.001\t75-619154",
            "mdp.001\t75619154",
            "mdp.002\t75-619154",
            "mdp.002\t75619154",
        ]
    );
    Ok(())
}

#[test]
fn dump_feed_skips_unparseable_lines_but_counts_them() -> Result<()> {
    let dir = tempdir()?;
    let engine = engine(dir.path());
    let feed = dir.path().join("hathi_upd_20240115.txt.gz");
    let lines = vec![
        feed_line("mdp.001", "Good"),
        "mdp.bad\tway\ttoo\tshort".to_string(),
        feed_line("mdp.002", "Also good"),
    ];
    write_feed(&feed, &lines);

    let dump = engine.dump_feed(&feed, &dir.path().join("dump"))?;

    assert_eq!(dump.feed_lines, 3);
    assert_eq!(read_lines(&dump.main).len(), 2);
    Ok(())
}

#[test]
fn dump_feed_of_an_empty_feed_writes_empty_files() -> Result<()> {
    let dir = tempdir()?;
    let engine = engine(dir.path());
    let feed = dir.path().join("hathi_upd_20240115.txt.gz");
    write_feed(&feed, &[]);

    let dump = engine.dump_feed(&feed, &dir.path().join("dump"))?;

    assert_eq!(dump.feed_lines, 0);
    for path in dump.files.values() {
        assert!(path.exists());
        assert!(read_lines(path).is_empty());
    }
    Ok(())
}

#[test]
fn dump_store_of_an_empty_store_is_empty() -> Result<()> {
    let dir = tempdir()?;
    let engine = engine(dir.path());
    let out = dir.path().join("current");

    let rows = engine.dump_store(&out)?;

    assert_eq!(rows, 0);
    assert!(read_lines(&out).is_empty());
    Ok(())
}
