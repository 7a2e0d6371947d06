//! Document attributes: list summary and full detail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attachment::FileFormat;

/// Summary attributes returned by `GET /documents`.
///
/// `object_id` is optional here: the list endpoint omits it for some
/// document types, so the detail route is the authoritative source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAttributes {
    pub agency_id: Option<String>,
    pub comment_end_date: Option<String>,
    pub comment_start_date: Option<String>,
    pub docket_id: Option<String>,
    pub document_type: Option<String>,
    pub fr_doc_num: Option<String>,
    pub highlighted_content: Option<String>,
    pub last_modified_date: DateTime<Utc>,
    pub object_id: Option<String>,
    #[serde(default)]
    pub open_for_comment: bool,
    pub posted_date: Option<String>,
    pub subtype: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub withdrawn: bool,
}

/// Full attributes returned by `GET /documents/{documentId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetailAttributes {
    pub object_id: String,
    pub docket_id: Option<String>,
    pub agency_id: Option<String>,
    pub document_type: Option<String>,
    pub subtype: Option<String>,
    pub title: Option<String>,
    pub doc_abstract: Option<String>,
    pub fr_doc_num: Option<String>,
    pub page_count: Option<i64>,
    pub posted_date: Option<String>,
    pub comment_start_date: Option<String>,
    pub comment_end_date: Option<String>,
    #[serde(default)]
    pub open_for_comment: bool,
    #[serde(default)]
    pub withdrawn: bool,
    pub modify_date: Option<String>,
    #[serde(default)]
    pub file_formats: Option<Vec<FileFormat>>,
}
