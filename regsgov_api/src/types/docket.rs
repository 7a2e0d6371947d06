//! Docket attributes: list summary and full detail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary attributes returned by `GET /dockets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocketAttributes {
    pub agency_id: Option<String>,
    pub docket_type: Option<String>,
    pub highlighted_content: Option<String>,
    /// UTC timestamp of the last modification.
    pub last_modified_date: DateTime<Utc>,
    pub object_id: String,
    pub title: Option<String>,
}

/// Full attributes returned by `GET /dockets/{docketId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocketDetailAttributes {
    pub object_id: String,
    pub agency_id: Option<String>,
    pub docket_type: Option<String>,
    pub title: Option<String>,
    pub dk_abstract: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    pub rin: Option<String>,
    pub modify_date: Option<String>,
}
