use crate::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use rusqlite::OptionalExtension;
use schema::{RecordSchema, Transform};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use store::Store;

/// DDL for the fixture tables, derived from the column list: integer
/// affinity where the transforms produce integers, text elsewhere, the
/// dependent tables cascading from the key, and the run log. Production
/// DDL is an operator concern; tests carry their own.
pub(crate) fn fixture_ddl(schema: &RecordSchema) -> String {
    let key = schema.key_column();
    let mut columns: Vec<String> = Vec::new();
    for spec in schema.columns() {
        if spec.name == key {
            columns.push(format!("{key} TEXT PRIMARY KEY"));
            continue;
        }
        let affinity = if !spec.multi_valued
            && matches!(
                spec.transform,
                Transform::IntWithFallback | Transform::AllowFlag
            ) {
            "INTEGER"
        } else {
            "TEXT"
        };
        columns.push(format!("{} {affinity}", spec.name));
    }

    let mut ddl = format!(
        "CREATE TABLE {} ({});\n",
        schema.main_table(),
        columns.join(", ")
    );
    for table in schema.dependent_tables() {
        ddl.push_str(&format!(
            "CREATE TABLE {table} ({key} TEXT NOT NULL REFERENCES {main}({key}) ON DELETE CASCADE, value TEXT NOT NULL);\n",
            main = schema.main_table(),
        ));
    }
    ddl.push_str("CREATE TABLE hf_log (hathifile TEXT NOT NULL UNIQUE, applied_at TEXT NOT NULL);\n");
    ddl
}

pub(crate) fn fixture_store() -> Store {
    let store = Store::open_in_memory().expect("open in-memory store");
    store
        .connection()
        .execute_batch(&fixture_ddl(&RecordSchema::hathifile()))
        .expect("create fixture tables");
    store
}

/// An engine over a fresh in-memory store, scratching under `dir`.
pub(crate) fn engine(dir: &Path) -> Engine {
    Engine::new(fixture_store(), dir.join("scratch"))
}

/// One full-arity feed line. The identifier columns carry a valid value
/// each so every dependent table gets rows; `title` is what tests vary to
/// make a record "change".
pub(crate) fn feed_line(htid: &str, title: &str) -> String {
    [
        htid,
        "allow",
        "pd",
        "990012345",
        "",
        "MIU",
        "005138825",
        "1172208",
        "0394404289",
        "0317-8471",
        "75-619154",
        title,
        "Imprint Pub.",
        "bib",
        "2009-01-08 09:30:17",
        "0",
        "2008",
        "miu",
        "eng",
        "BK",
        "MIU",
        "umich",
        "umich",
        "google",
        "open",
        "Author, Some",
    ]
    .join("\t")
}

pub(crate) fn write_feed(path: &Path, lines: &[String]) {
    let mut file = File::create(path).expect("create feed file");
    for line in lines {
        writeln!(file, "{line}").expect("write feed line");
    }
}

/// Same as [`write_feed`] but actually gzip-compressed, for the tests
/// that cover the compressed path end to end.
pub(crate) fn write_gzip_feed(path: &Path, lines: &[String]) {
    let file = File::create(path).expect("create feed file");
    let mut gz = GzEncoder::new(file, Compression::default());
    for line in lines {
        writeln!(gz, "{line}").expect("write feed line");
    }
    gz.finish().expect("finish gzip stream");
}

pub(crate) fn count(engine: &Engine, table: &str) -> i64 {
    engine
        .store()
        .connection()
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
        .expect("count rows")
}

pub(crate) fn title_of(engine: &Engine, htid: &str) -> Option<String> {
    engine
        .store()
        .connection()
        .query_row("SELECT title FROM hf WHERE htid = ?1", [htid], |r| r.get(0))
        .optional()
        .expect("query title")
}

pub(crate) fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("read derivative file")
        .lines()
        .map(str::to_string)
        .collect()
}
