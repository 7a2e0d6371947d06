//! SQLite storage for retrieved records.
//!
//! Every record type maps to one table whose columns are the record's serde
//! field names. Rows are upserted on the table's key columns, and the count
//! of rows that did not exist before is reported.

use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde_json::Value;

use crate::records::Row;

/// Current schema version, stored in `PRAGMA user_version`.
const SCHEMA_VERSION: i32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record for table {0} did not serialize to a flat object")]
    NotARow(&'static str),
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    #[doc(hidden)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Create tables and indexes, then stamp the schema version.
    pub fn init(&self) -> Result<(), DbError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;

        if version < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i32, DbError> {
        Ok(self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?)
    }

    /// Insert or update `rows` in `R::TABLE`. Returns how many keys were new.
    pub fn upsert<R: Row>(&mut self, rows: &[R]) -> Result<usize, DbError> {
        let Some(first) = rows.first() else {
            return Ok(0);
        };
        let columns: Vec<String> = row_object::<R>(first)?.keys().cloned().collect();
        let insert_sql = upsert_sql(R::TABLE, &columns, R::KEY_COLUMNS);
        let exists_sql = exists_sql(R::TABLE, R::KEY_COLUMNS);

        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut exists_stmt = tx.prepare(&exists_sql)?;
            let mut insert_stmt = tx.prepare(&insert_sql)?;
            for row in rows {
                let existing: Option<i64> = exists_stmt
                    .query_row(params_from_iter(row.key()), |r| r.get(0))
                    .optional()?;
                if existing.is_none() {
                    inserted += 1;
                }

                let object = row_object(row)?;
                let values = columns
                    .iter()
                    .map(|c| sql_value(object.get(c).unwrap_or(&Value::Null)));
                insert_stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        tracing::debug!(
            "Upserted {} rows into {} ({} new)",
            rows.len(),
            R::TABLE,
            inserted
        );
        Ok(inserted)
    }

    /// Number of rows in one of the record tables.
    pub fn row_count(&self, table: &str) -> Result<i64, DbError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(1) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn row_object<R: Row>(row: &R) -> Result<serde_json::Map<String, Value>, DbError> {
    match serde_json::to_value(row)? {
        Value::Object(map) => Ok(map),
        _ => Err(DbError::NotARow(R::TABLE)),
    }
}

fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn upsert_sql(table: &str, columns: &[String], keys: &[&str]) -> String {
    let cols = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let conflict = keys
        .iter()
        .map(|k| quote_ident(k))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = columns
        .iter()
        .filter(|c| !keys.contains(&c.as_str()))
        .map(|c| format!("{0} = excluded.{0}", quote_ident(c)))
        .collect::<Vec<_>>();

    let action = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", updates.join(", "))
    };
    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) {}",
        quote_ident(table),
        cols,
        placeholders,
        conflict,
        action
    )
}

fn exists_sql(table: &str, keys: &[&str]) -> String {
    let predicate = keys
        .iter()
        .enumerate()
        .map(|(i, k)| format!("{} = ?{}", quote_ident(k), i + 1))
        .collect::<Vec<_>>()
        .join(" AND ");
    format!(
        "SELECT 1 FROM {} WHERE {} LIMIT 1",
        quote_ident(table),
        predicate
    )
}
