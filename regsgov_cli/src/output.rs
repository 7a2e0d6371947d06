//! Destination arguments, progress display and run summaries.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use regsgov_lib::harvest::Progress;
use regsgov_lib::{
    CommentDetail, CommentHeader, CsvStore, Db, Destinations, DocumentHeader, PipelineReport,
    Row, TrackerSummary,
};
use serde::Serialize;

/// Where retrieved records are written.
#[derive(Args)]
pub struct DestinationArgs {
    /// Directory for CSV output
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Prefix for CSV file names (defaults to the docket or document ID, else "regsgov")
    #[arg(long)]
    pub root: Option<String>,

    /// CSV file for document headers (default: {root}_documents.csv)
    #[arg(long)]
    pub documents_file: Option<PathBuf>,

    /// CSV file for comment headers (default: {root}_comment_headers.csv)
    #[arg(long)]
    pub comment_headers_file: Option<PathBuf>,

    /// CSV file for comment details (default: {root}_comments.csv)
    #[arg(long)]
    pub comments_file: Option<PathBuf>,

    /// SQLite database to upsert into
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Skip CSV output (requires --db)
    #[arg(long)]
    pub no_csv: bool,
}

impl DestinationArgs {
    /// Open the configured stores. `default_root` names CSV files when `--root` is absent.
    pub fn open(&self, default_root: &str) -> Result<Destinations> {
        if self.no_csv && self.db.is_none() {
            anyhow::bail!("--no-csv needs --db, otherwise nothing would be written");
        }

        let mut dest = Destinations::new();
        if !self.no_csv {
            let root = self.root.as_deref().unwrap_or(default_root);
            let mut store = CsvStore::new(&self.out_dir, root)?;
            if let Some(file) = &self.documents_file {
                store = store.with_file(DocumentHeader::TABLE, file);
            }
            if let Some(file) = &self.comment_headers_file {
                store = store.with_file(CommentHeader::TABLE, file);
            }
            if let Some(file) = &self.comments_file {
                store = store.with_file(CommentDetail::TABLE, file);
            }
            dest = dest.with_csv(store);
        }
        if let Some(path) = &self.db {
            let db = Db::open(path)?;
            db.init()?;
            dest = dest.with_db(db);
        }
        Ok(dest)
    }
}

pub fn new_spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {spinner} {msg}",
    )?);
    pb.enable_steady_tick(Duration::from_millis(200));
    Ok(pb)
}

/// Progress callback that mirrors harvester events on a spinner.
pub fn spinner_progress(pb: ProgressBar) -> impl Fn(&Progress) + Send + Sync + 'static {
    move |event| pb.set_message(progress_message(event))
}

fn progress_message(event: &Progress) -> String {
    match event {
        Progress::Page {
            kind,
            pass,
            page,
            records,
        } => format!("{kind} headers: pass {pass}, page {page}, {records} records"),
        Progress::Detail { kind, done, total } => {
            format!("{kind} details: {done}/{total}")
        }
    }
}

pub fn print_report(report: &PipelineReport) {
    eprintln!("Documents found:           {}", report.documents_found);
    eprintln!("Comments found:            {}", report.comments_found);
    eprintln!("Comment details retrieved: {}", report.comments_retrieved);
    eprintln!("Duplicates removed:        {}", report.duplicates_removed);
    eprintln!(
        "Rows written: {} document headers, {} document details, {} comment headers, {} comment details",
        report.documents_written,
        report.document_details_written,
        report.comment_headers_written,
        report.comment_details_written
    );
    if !report.failures.is_empty() {
        eprintln!("Partial failures ({}):", report.failures.len());
        for failure in &report.failures {
            eprintln!("  - {}", failure);
        }
    }
}

pub fn print_tracker(summary: &TrackerSummary) {
    eprintln!(
        "API requests: {} made, {} succeeded, {} quota-limited, {} failed; {:.0}s spent waiting for quota",
        summary.requests_made,
        summary.requests_succeeded,
        summary.requests_quota_limited,
        summary.requests_failed,
        summary.total_wait_secs
    );
}

/// Write records to `out` as CSV with a header row.
pub fn write_csv<T: Serialize, W: Write>(records: &[T], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_csv<T: Serialize>(records: &[T]) -> Result<()> {
    write_csv(records, std::io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regsgov_lib::types::ResourceKind;

    fn args(out_dir: PathBuf) -> DestinationArgs {
        DestinationArgs {
            out_dir,
            root: None,
            documents_file: None,
            comment_headers_file: None,
            comments_file: None,
            db: None,
            no_csv: false,
        }
    }

    #[test]
    fn no_csv_without_db_is_rejected() {
        let mut a = args(std::env::temp_dir());
        a.no_csv = true;
        assert!(a.open("root").is_err());
    }

    #[test]
    fn csv_destination_uses_default_root() {
        let dir = std::env::temp_dir().join(format!("regsgov-cli-out-{}", std::process::id()));
        let dest = args(dir.clone()).open("FDA-2021-N-0270").unwrap();
        let store = dest.csv.as_ref().unwrap();
        assert_eq!(
            store.path_for("comment_details"),
            dir.join("FDA-2021-N-0270_comments.csv")
        );
        assert!(dest.db.is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn page_progress_message() {
        let msg = progress_message(&Progress::Page {
            kind: ResourceKind::Comment,
            pass: 2,
            page: 7,
            records: 1750,
        });
        assert_eq!(msg, "comment headers: pass 2, page 7, 1750 records");
    }

    #[test]
    fn detail_progress_message() {
        let msg = progress_message(&Progress::Detail {
            kind: ResourceKind::Document,
            done: 3,
            total: 10,
        });
        assert_eq!(msg, "document details: 3/10");
    }

    #[test]
    fn csv_output_has_header_row() {
        #[derive(Serialize)]
        struct R {
            id: &'static str,
            n: u32,
        }
        let mut buf = Vec::new();
        write_csv(&[R { id: "a", n: 1 }, R { id: "b", n: 2 }], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "id,n\na,1\nb,2\n");
    }
}
