//! Destinations the pipeline writes each completed stage to.

use crate::csv_store::{CsvStore, CsvStoreError};
use crate::db::{Db, DbError};
use crate::records::Row;

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Csv(#[from] CsvStoreError),
}

/// A store that accepts batches of rows and reports how many were new.
pub trait Sink {
    fn upsert<R: Row>(&mut self, rows: &[R]) -> Result<usize, SinkError>;
}

impl Sink for Db {
    fn upsert<R: Row>(&mut self, rows: &[R]) -> Result<usize, SinkError> {
        Ok(Db::upsert(self, rows)?)
    }
}

impl Sink for CsvStore {
    fn upsert<R: Row>(&mut self, rows: &[R]) -> Result<usize, SinkError> {
        Ok(CsvStore::upsert(self, rows)?)
    }
}

/// Writes to a CSV directory, a SQLite database, or both.
///
/// The reported count is the larger of the two, since either store may
/// already hold rows the other lacks.
#[derive(Default)]
pub struct Destinations {
    pub csv: Option<CsvStore>,
    pub db: Option<Db>,
}

impl Destinations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_csv(mut self, store: CsvStore) -> Self {
        self.csv = Some(store);
        self
    }

    pub fn with_db(mut self, db: Db) -> Self {
        self.db = Some(db);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.csv.is_none() && self.db.is_none()
    }
}

impl Sink for Destinations {
    fn upsert<R: Row>(&mut self, rows: &[R]) -> Result<usize, SinkError> {
        let mut written = 0;
        if let Some(csv) = &mut self.csv {
            written = written.max(Sink::upsert(csv, rows)?);
        }
        if let Some(db) = &mut self.db {
            written = written.max(Sink::upsert(db, rows)?);
        }
        Ok(written)
    }
}

/// Collects rows in memory, keyed per table.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: std::collections::HashMap<&'static str, Vec<serde_json::Value>>,
    keys: std::collections::HashSet<(&'static str, Vec<String>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows stored for `table`, as JSON objects.
    pub fn rows(&self, table: &str) -> &[serde_json::Value] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }
}

impl Sink for MemorySink {
    fn upsert<R: Row>(&mut self, rows: &[R]) -> Result<usize, SinkError> {
        let mut written = 0;
        for row in rows {
            if self.keys.insert((R::TABLE, row.key())) {
                let value = serde_json::to_value(row).map_err(DbError::from)?;
                self.tables.entry(R::TABLE).or_default().push(value);
                written += 1;
            }
        }
        Ok(written)
    }
}
