///! # CLI - Hathifiles Loader
///!
///! A one-shot command-line interface for the hathifile synchronization
///! engine. Each invocation runs one command against the configured store
///! and prints its outcome to stdout; library logging goes to stderr via
///! `env_logger` (set `RUST_LOG=info` to watch a run).
///!
///! ## Commands
///!
///! ```text
///! sync <feed-file>     Delta-load a feed: upsert what changed, derive
///!                      deletions for full feeds
///! load <feed-file>     Apply every record of a feed without a delta
///! pending <feed-dir>   List feed files not yet applied, in load order
///! ```
///!
///! ## Configuration
///!
///! All settings are controlled via environment variables:
///!
///! ```text
///! HATHIFILES_DB       SQLite database path  (default: "hathifiles.db")
///! HATHIFILES_SCRATCH  Scratch directory     (default: system temp)
///! HATHIFILES_BATCH    Writer batch size     (default: 100)
///! ```
///!
///! ## Example
///!
///! ```text
///! $ cargo run -p cli -- sync feeds/hathi_upd_20240102.txt.gz
///! feeds/hathi_upd_20240102.txt.gz: 3 additions, 10 changes, 0 deletions, 7 updates (5000 feed lines)
///! ```

use anyhow::Result;
use engine::Engine;
use std::path::PathBuf;
use store::Store;

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn usage() -> ! {
    eprintln!("usage: cli <command> ...");
    eprintln!("  sync <feed-file>     delta-load a feed into the store");
    eprintln!("  load <feed-file>     apply every record of a feed, no delta");
    eprintln!("  pending <feed-dir>   list feed files not yet applied");
    std::process::exit(2);
}

fn main() -> Result<()> {
    env_logger::init();

    // Configuration via environment variables with sensible defaults.
    //
    //  HATHIFILES_DB      - SQLite database path  (default: "hathifiles.db")
    //  HATHIFILES_SCRATCH - scratch directory     (default: system temp)
    //  HATHIFILES_BATCH   - writer batch size     (default: 100)
    let db_path = env_or("HATHIFILES_DB", "hathifiles.db");
    let scratch = std::env::var("HATHIFILES_SCRATCH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("hathifiles"));
    let batch_size: usize = env_or("HATHIFILES_BATCH", "100").parse().unwrap_or(100);

    let mut args = std::env::args().skip(1);
    let command = match args.next() {
        Some(command) => command,
        None => usage(),
    };

    let store = Store::open(&db_path)?;
    let mut engine = Engine::new(store, &scratch).with_batch_size(batch_size);

    match command.as_str() {
        "sync" => {
            let feed = args.next().map(PathBuf::from).unwrap_or_else(|| usage());
            let stats = engine.sync_file(&feed)?;
            println!(
                "{}: {} additions, {} changes, {} deletions, {} updates ({} feed lines)",
                feed.display(),
                stats.additions,
                stats.changes,
                stats.deletions,
                stats.updates,
                stats.feed_lines
            );
        }
        "load" => {
            let feed = args.next().map(PathBuf::from).unwrap_or_else(|| usage());
            let outcome = engine.apply_file(&feed)?;
            println!(
                "{}: {} records written, {} skipped",
                feed.display(),
                outcome.records_written,
                outcome.records_skipped
            );
        }
        "pending" => {
            let feed_dir = args.next().map(PathBuf::from).unwrap_or_else(|| usage());
            for name in engine.pending(&feed_dir)? {
                println!("{name}");
            }
        }
        _ => usage(),
    }

    Ok(())
}
