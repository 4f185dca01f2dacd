use super::{read_lines, write_lines};
use crate::{comm_sorted, CommCounts, CommOutput};
use anyhow::Result;
use tempfile::tempdir;

// ---------- classification ----------

#[test]
fn classifies_into_three_streams() -> Result<()> {
    let dir = tempdir()?;
    let left = dir.path().join("left");
    let right = dir.path().join("right");
    write_lines(&left, &["apple", "banana", "cherry", "damson"]);
    write_lines(&right, &["banana", "cherry", "elder", "fig"]);

    let left_only = dir.path().join("left_only");
    let right_only = dir.path().join("right_only");
    let common = dir.path().join("common");
    let counts = comm_sorted(
        &left,
        &right,
        CommOutput {
            left_only: Some(&left_only),
            right_only: Some(&right_only),
            common: Some(&common),
        },
    )?;

    assert_eq!(
        counts,
        CommCounts {
            left_only: 2,
            right_only: 2,
            common: 2,
        }
    );
    assert_eq!(read_lines(&left_only), vec!["apple", "damson"]);
    assert_eq!(read_lines(&right_only), vec!["elder", "fig"]);
    assert_eq!(read_lines(&common), vec!["banana", "cherry"]);
    Ok(())
}

#[test]
fn identical_files_are_all_common() -> Result<()> {
    let dir = tempdir()?;
    let left = dir.path().join("left");
    let right = dir.path().join("right");
    write_lines(&left, &["a", "b", "c"]);
    write_lines(&right, &["a", "b", "c"]);

    let counts = comm_sorted(&left, &right, CommOutput::default())?;

    assert_eq!(
        counts,
        CommCounts {
            left_only: 0,
            right_only: 0,
            common: 3,
        }
    );
    Ok(())
}

#[test]
fn disjoint_files_share_nothing() -> Result<()> {
    let dir = tempdir()?;
    let left = dir.path().join("left");
    let right = dir.path().join("right");
    write_lines(&left, &["a", "c", "e"]);
    write_lines(&right, &["b", "d"]);

    let counts = comm_sorted(&left, &right, CommOutput::default())?;

    assert_eq!(
        counts,
        CommCounts {
            left_only: 3,
            right_only: 2,
            common: 0,
        }
    );
    Ok(())
}

#[test]
fn both_empty_yields_zero_counts() -> Result<()> {
    let dir = tempdir()?;
    let left = dir.path().join("left");
    let right = dir.path().join("right");
    write_lines(&left, &[]);
    write_lines(&right, &[]);

    let counts = comm_sorted(&left, &right, CommOutput::default())?;

    assert_eq!(counts, CommCounts::default());
    Ok(())
}

// ---------- duplicate pairing ----------

#[test]
fn duplicates_pair_one_to_one() -> Result<()> {
    let dir = tempdir()?;
    let left = dir.path().join("left");
    let right = dir.path().join("right");
    write_lines(&left, &["x", "x", "y"]);
    write_lines(&right, &["x", "y", "y", "y"]);

    let left_only = dir.path().join("left_only");
    let right_only = dir.path().join("right_only");
    let counts = comm_sorted(
        &left,
        &right,
        CommOutput {
            left_only: Some(&left_only),
            right_only: Some(&right_only),
            common: None,
        },
    )?;

    // One x and one y pair up; the second x is left-only, the extra two
    // ys are right-only.
    assert_eq!(
        counts,
        CommCounts {
            left_only: 1,
            right_only: 2,
            common: 2,
        }
    );
    assert_eq!(read_lines(&left_only), vec!["x"]);
    assert_eq!(read_lines(&right_only), vec!["y", "y"]);
    Ok(())
}

// ---------- sink selection ----------

#[test]
fn none_sinks_count_without_writing() -> Result<()> {
    let dir = tempdir()?;
    let left = dir.path().join("left");
    let right = dir.path().join("right");
    write_lines(&left, &["a", "b"]);
    write_lines(&right, &["b", "c"]);

    let right_only = dir.path().join("right_only");
    let counts = comm_sorted(
        &left,
        &right,
        CommOutput {
            left_only: None,
            right_only: Some(&right_only),
            common: None,
        },
    )?;

    assert_eq!(
        counts,
        CommCounts {
            left_only: 1,
            right_only: 1,
            common: 1,
        }
    );
    assert_eq!(read_lines(&right_only), vec!["c"]);
    assert!(!dir.path().join("left_only").exists());
    Ok(())
}
