//! Retrieval engine for Regulations.gov: quota-aware pagination, cursor
//! advancement past the per-query cap, deduplication, detail expansion, and
//! the docket → documents → comments pipeline with CSV and SQLite stores.

pub mod cancel;
pub mod csv_store;
pub mod db;
pub mod dedup;
pub mod details;
pub mod eastern;
pub mod error;
pub mod harvest;
pub mod pipeline;
pub mod quota;
pub mod records;
pub mod sink;
pub mod validation;

pub use regsgov_api;
pub use regsgov_api::types;
pub use regsgov_api::{Client, CommentQuery, DocketQuery, DocumentQuery, Query};

pub use cancel::CancelFlag;
pub use csv_store::{CsvStore, CsvStoreError};
pub use db::{Db, DbError};
pub use dedup::{dedup_by_key, dedup_headers, Deduped};
pub use details::{DetailBatch, DetailKey, SkippedItem};
pub use error::{HarvestError, Stage};
pub use harvest::{Harvester, PageLimits, Pass, Progress};
pub use pipeline::{PartialFailure, Pipeline, PipelineReport};
pub use quota::{Outcome, QuotaGate, RequestTracker, TrackerSummary};
pub use records::{
    CommentDetail, CommentHeader, DetailRecord, DocketDetail, DocketHeader, DocumentDetail,
    DocumentHeader, HeaderRecord, Row,
};
pub use sink::{Destinations, MemorySink, Sink, SinkError};
