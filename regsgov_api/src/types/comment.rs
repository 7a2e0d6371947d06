//! Comment attributes: list summary and full detail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary attributes returned by `GET /comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAttributes {
    pub agency_id: Option<String>,
    pub document_type: Option<String>,
    pub highlighted_content: Option<String>,
    pub last_modified_date: DateTime<Utc>,
    pub object_id: String,
    pub posted_date: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub withdrawn: bool,
}

/// Full attributes returned by `GET /comments/{commentId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDetailAttributes {
    pub object_id: String,
    pub comment_on_document_id: Option<String>,
    pub docket_id: Option<String>,
    pub agency_id: Option<String>,
    pub document_type: Option<String>,
    pub title: Option<String>,
    /// Full comment text.
    pub comment: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization: Option<String>,
    pub city: Option<String>,
    pub state_province_region: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub posted_date: Option<String>,
    pub receive_date: Option<String>,
    pub modify_date: Option<String>,
    #[serde(default)]
    pub withdrawn: bool,
    pub reason_withdrawn: Option<String>,
    pub duplicate_comments: Option<i64>,
    pub tracking_nbr: Option<String>,
}
