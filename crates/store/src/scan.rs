//! Streaming scan of the main table.

use rusqlite::types::ValueRef;
use schema::{RecordSchema, Scalar};

use crate::{Store, StoreError};

impl Store {
    /// Streams every main-table row as [`Scalar`]s in schema column order,
    /// calling `emit` once per row. Returns the number of rows scanned.
    ///
    /// SQL NULL, INTEGER, and TEXT map onto the three scalar shapes the
    /// projection renderer knows, so a row written from a feed record
    /// reads back into exactly the line the feed side would render. Any
    /// other storage class in a scanned column is an error; nothing the
    /// writer produces has one.
    pub fn scan_main<F>(&self, schema: &RecordSchema, mut emit: F) -> Result<u64, StoreError>
    where
        F: FnMut(&[Scalar]) -> std::io::Result<()>,
    {
        let columns: Vec<&str> = schema.columns().iter().map(|c| c.name).collect();
        let sql = format!("SELECT {} FROM {}", columns.join(","), schema.main_table());
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut scalars: Vec<Scalar> = Vec::with_capacity(columns.len());
        let mut count = 0u64;
        while let Some(row) = rows.next()? {
            scalars.clear();
            for (i, column) in columns.iter().enumerate() {
                let scalar = match row.get_ref(i)? {
                    ValueRef::Null => Scalar::Null,
                    ValueRef::Integer(n) => Scalar::Int(n),
                    ValueRef::Text(text) => {
                        Scalar::Text(String::from_utf8_lossy(text).into_owned())
                    }
                    other => {
                        return Err(rusqlite::Error::InvalidColumnType(
                            i,
                            column.to_string(),
                            other.data_type(),
                        )
                        .into())
                    }
                };
                scalars.push(scalar);
            }
            emit(&scalars)?;
            count += 1;
        }
        Ok(count)
    }
}
