use serde::{Deserialize, Serialize};

/// A downloadable rendition of a document or attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFormat {
    pub file_url: String,
    pub format: Option<String>,
    pub size: Option<i64>,
}

/// Attributes of an `attachments` entry in a detail response's `included` list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachmentAttributes {
    pub title: Option<String>,
    pub doc_order: Option<i64>,
    pub file_formats: Option<Vec<FileFormat>>,
    pub restrict_reason: Option<String>,
    pub restrict_reason_type: Option<String>,
}
