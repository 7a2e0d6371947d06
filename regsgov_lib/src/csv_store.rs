//! Append-only CSV store: one file per record table.
//!
//! Before appending, the store reads the key columns already present in the
//! target file and writes only rows whose key is new, so re-running a
//! workflow against the same output directory adds nothing.

use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use csv::{Reader, WriterBuilder};

use crate::records::Row;

#[derive(thiserror::Error, Debug)]
pub enum CsvStoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{path} has no '{column}' column; refusing to append to a file with a different layout")]
    MissingColumn { path: PathBuf, column: String },
}

/// Writes record tables as CSV files under one output directory.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
    root: String,
    overrides: HashMap<String, PathBuf>,
}

impl CsvStore {
    /// Store files in `dir`, named `{root}_<suffix>.csv`. Creates `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>, root: impl Into<String>) -> Result<Self, CsvStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CsvStoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            root: root.into(),
            overrides: HashMap::new(),
        })
    }

    /// Use `file` for `table` instead of the default name. Relative paths
    /// resolve against the output directory.
    pub fn with_file(mut self, table: &str, file: impl Into<PathBuf>) -> Self {
        self.overrides.insert(table.to_string(), file.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `table`.
    pub fn path_for(&self, table: &str) -> PathBuf {
        match self.overrides.get(table) {
            Some(file) => self.dir.join(file),
            None => self
                .dir
                .join(format!("{}_{}.csv", self.root, default_suffix(table))),
        }
    }

    /// Append rows whose key is not yet in the file. Returns rows written.
    pub fn upsert<R: Row>(&mut self, rows: &[R]) -> Result<usize, CsvStoreError> {
        let path = self.path_for(R::TABLE);
        let exists = path
            .metadata()
            .map(|m| m.len() > 0)
            .unwrap_or(false);

        let mut seen = if exists {
            read_keys(&path, R::KEY_COLUMNS)?
        } else {
            HashSet::new()
        };

        let fresh: Vec<&R> = rows.iter().filter(|r| seen.insert(r.key())).collect();
        if fresh.is_empty() {
            tracing::debug!("No new rows for {}", path.display());
            return Ok(0);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| CsvStoreError::Io {
                path: path.clone(),
                source,
            })?;
        let mut wtr = WriterBuilder::new().has_headers(!exists).from_writer(file);
        for row in &fresh {
            wtr.serialize(row)?;
        }
        wtr.flush().map_err(|source| CsvStoreError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Appended {} rows to {}", fresh.len(), path.display());
        Ok(fresh.len())
    }
}

/// File suffix for a table when no override is given.
fn default_suffix(table: &str) -> &str {
    match table {
        "docket_headers" => "dockets",
        "document_headers" => "documents",
        "comment_details" => "comments",
        other => other,
    }
}

/// Read the key tuples already stored in `path`.
pub fn read_keys(path: &Path, key_columns: &[&str]) -> Result<HashSet<Vec<String>>, CsvStoreError> {
    let mut rdr = Reader::from_path(path)?;
    let headers = rdr.headers()?.clone();
    let indexes = key_columns
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|h| h == *column)
                .ok_or_else(|| CsvStoreError::MissingColumn {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut keys = HashSet::new();
    for record in rdr.records() {
        let record = record?;
        keys.insert(
            indexes
                .iter()
                .map(|&i| record.get(i).unwrap_or_default().to_string())
                .collect(),
        );
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CommentDetail, DocumentHeader};
    use chrono::{TimeZone, Utc};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "regsgov-csv-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn document(id: &str, object_id: &str) -> DocumentHeader {
        DocumentHeader {
            document_id: id.to_string(),
            object_id: object_id.to_string(),
            docket_id: Some("FDA-2021-N-0270".to_string()),
            agency_id: Some("FDA".to_string()),
            document_type: Some("Notice".to_string()),
            subtype: None,
            title: Some("Title, with comma".to_string()),
            fr_doc_num: None,
            highlighted_content: None,
            comment_start_date: None,
            comment_end_date: None,
            open_for_comment: true,
            posted_date: None,
            last_modified_date: Utc.with_ymd_and_hms(2021, 4, 6, 14, 51, 27).unwrap(),
            withdrawn: false,
        }
    }

    #[test]
    fn default_file_names() {
        let dir = temp_dir("names");
        let store = CsvStore::new(&dir, "FDA-2021-N-0270").unwrap();
        assert_eq!(
            store.path_for("document_headers"),
            dir.join("FDA-2021-N-0270_documents.csv")
        );
        assert_eq!(
            store.path_for("comment_headers"),
            dir.join("FDA-2021-N-0270_comment_headers.csv")
        );
        assert_eq!(
            store.path_for("comment_details"),
            dir.join("FDA-2021-N-0270_comments.csv")
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn override_file_name() {
        let dir = temp_dir("override");
        let store = CsvStore::new(&dir, "root")
            .unwrap()
            .with_file(CommentDetail::TABLE, "all_comments.csv");
        assert_eq!(store.path_for("comment_details"), dir.join("all_comments.csv"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn append_only_new_keys() {
        let dir = temp_dir("append");
        let mut store = CsvStore::new(&dir, "root").unwrap();

        let first = vec![document("D-1", "o1"), document("D-2", "o2")];
        assert_eq!(store.upsert(&first).unwrap(), 2);
        assert_eq!(store.upsert(&first).unwrap(), 0);

        let second = vec![document("D-2", "o2"), document("D-3", "o3")];
        assert_eq!(store.upsert(&second).unwrap(), 1);

        let path = store.path_for("document_headers");
        let keys = read_keys(&path, DocumentHeader::KEY_COLUMNS).unwrap();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&vec!["D-3".to_string(), "o3".to_string()]));

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("document_id")).count(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn repeated_key_within_batch_written_once() {
        let dir = temp_dir("batch");
        let mut store = CsvStore::new(&dir, "root").unwrap();
        let rows = vec![document("D-1", "o1"), document("D-1", "o1")];
        assert_eq!(store.upsert(&rows).unwrap(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn mismatched_layout_rejected() {
        let dir = temp_dir("layout");
        let store = CsvStore::new(&dir, "root").unwrap();
        let path = store.path_for("document_headers");
        fs::write(&path, "foo,bar\n1,2\n").unwrap();

        let mut store = store;
        let err = store.upsert(&[document("D-1", "o1")]).unwrap_err();
        assert!(matches!(err, CsvStoreError::MissingColumn { .. }));
        let _ = fs::remove_dir_all(&dir);
    }
}
