//! Flat header and detail records, one typed schema per resource kind.
//!
//! Each record is projected explicitly from the API's attribute structs and
//! serializes to a flat row, so the same value can go to a CSV file or a
//! SQLite table without further mapping.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use regsgov_api::types::{
    CommentAttributes, CommentDetailAttributes, DetailResponse, DocketAttributes,
    DocketDetailAttributes, DocumentAttributes, DocumentDetailAttributes, FileFormat, Included,
    Resource, ResourceKind,
};
use regsgov_api::{CommentQuery, DocketQuery, DocumentQuery, Query};

/// Delimiter used when flattening URL lists into a single column.
pub const URL_DELIMITER: &str = ",";

/// A record that can be persisted as a row of a named table.
pub trait Row: Serialize {
    /// Table (or CSV file stem) the record belongs to.
    const TABLE: &'static str;
    /// Columns forming the record's unique key.
    const KEY_COLUMNS: &'static [&'static str];

    /// Key values in `KEY_COLUMNS` order.
    fn key(&self) -> Vec<String>;
}

/// Lightweight record returned by a paginated list endpoint.
pub trait HeaderRecord: Row + Clone {
    type Attributes: DeserializeOwned;
    type Query: Query;
    const KIND: ResourceKind;

    fn from_resource(resource: Resource<Self::Attributes>) -> Self;

    /// Public ID (docket, document or comment ID).
    fn public_id(&self) -> &str;

    /// Object ID, empty when the list endpoint did not expose one.
    fn object_id(&self) -> &str;

    /// UTC last-modified timestamp, the cursor field.
    fn last_modified(&self) -> DateTime<Utc>;
}

/// Full record fetched from a detail endpoint, keyed by object ID.
pub trait DetailRecord: Row + Clone {
    type Attributes: DeserializeOwned;
    const KIND: ResourceKind;
    /// Related resources to side-load with the request.
    const INCLUDE: Option<&'static str>;

    fn from_response(response: DetailResponse<Self::Attributes>) -> Self;

    fn public_id(&self) -> &str;

    fn object_id(&self) -> &str;
}

// ============================================================================
// Dockets
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocketHeader {
    pub docket_id: String,
    pub object_id: String,
    pub agency_id: Option<String>,
    pub docket_type: Option<String>,
    pub title: Option<String>,
    pub highlighted_content: Option<String>,
    pub last_modified_date: DateTime<Utc>,
}

impl Row for DocketHeader {
    const TABLE: &'static str = "docket_headers";
    const KEY_COLUMNS: &'static [&'static str] = &["docket_id", "object_id"];

    fn key(&self) -> Vec<String> {
        vec![self.docket_id.clone(), self.object_id.clone()]
    }
}

impl HeaderRecord for DocketHeader {
    type Attributes = DocketAttributes;
    type Query = DocketQuery;
    const KIND: ResourceKind = ResourceKind::Docket;

    fn from_resource(resource: Resource<DocketAttributes>) -> Self {
        let a = resource.attributes;
        Self {
            docket_id: resource.id,
            object_id: a.object_id,
            agency_id: a.agency_id,
            docket_type: a.docket_type,
            title: a.title,
            highlighted_content: a.highlighted_content,
            last_modified_date: a.last_modified_date,
        }
    }

    fn public_id(&self) -> &str {
        &self.docket_id
    }
    fn object_id(&self) -> &str {
        &self.object_id
    }
    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocketDetail {
    pub object_id: String,
    pub docket_id: String,
    pub agency_id: Option<String>,
    pub docket_type: Option<String>,
    pub title: Option<String>,
    pub dk_abstract: Option<String>,
    pub keywords: String,
    pub rin: Option<String>,
    pub modify_date: Option<String>,
}

impl Row for DocketDetail {
    const TABLE: &'static str = "docket_details";
    const KEY_COLUMNS: &'static [&'static str] = &["object_id"];

    fn key(&self) -> Vec<String> {
        vec![self.object_id.clone()]
    }
}

impl DetailRecord for DocketDetail {
    type Attributes = DocketDetailAttributes;
    const KIND: ResourceKind = ResourceKind::Docket;
    const INCLUDE: Option<&'static str> = None;

    fn from_response(response: DetailResponse<DocketDetailAttributes>) -> Self {
        let a = response.data.attributes;
        Self {
            object_id: a.object_id,
            docket_id: response.data.id,
            agency_id: a.agency_id,
            docket_type: a.docket_type,
            title: a.title,
            dk_abstract: a.dk_abstract,
            keywords: a.keywords.unwrap_or_default().join("; "),
            rin: a.rin,
            modify_date: a.modify_date,
        }
    }

    fn public_id(&self) -> &str {
        &self.docket_id
    }
    fn object_id(&self) -> &str {
        &self.object_id
    }
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub document_id: String,
    pub object_id: String,
    pub docket_id: Option<String>,
    pub agency_id: Option<String>,
    pub document_type: Option<String>,
    pub subtype: Option<String>,
    pub title: Option<String>,
    pub fr_doc_num: Option<String>,
    pub highlighted_content: Option<String>,
    pub comment_start_date: Option<String>,
    pub comment_end_date: Option<String>,
    pub open_for_comment: bool,
    pub posted_date: Option<String>,
    pub last_modified_date: DateTime<Utc>,
    pub withdrawn: bool,
}

impl Row for DocumentHeader {
    const TABLE: &'static str = "document_headers";
    const KEY_COLUMNS: &'static [&'static str] = &["document_id", "object_id"];

    fn key(&self) -> Vec<String> {
        vec![self.document_id.clone(), self.object_id.clone()]
    }
}

impl HeaderRecord for DocumentHeader {
    type Attributes = DocumentAttributes;
    type Query = DocumentQuery;
    const KIND: ResourceKind = ResourceKind::Document;

    fn from_resource(resource: Resource<DocumentAttributes>) -> Self {
        let a = resource.attributes;
        Self {
            document_id: resource.id,
            object_id: a.object_id.unwrap_or_default(),
            docket_id: a.docket_id,
            agency_id: a.agency_id,
            document_type: a.document_type,
            subtype: a.subtype,
            title: a.title,
            fr_doc_num: a.fr_doc_num,
            highlighted_content: a.highlighted_content,
            comment_start_date: a.comment_start_date,
            comment_end_date: a.comment_end_date,
            open_for_comment: a.open_for_comment,
            posted_date: a.posted_date,
            last_modified_date: a.last_modified_date,
            withdrawn: a.withdrawn,
        }
    }

    fn public_id(&self) -> &str {
        &self.document_id
    }
    fn object_id(&self) -> &str {
        &self.object_id
    }
    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub object_id: String,
    pub document_id: String,
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
    pub open_for_comment: bool,
    pub withdrawn: bool,
    pub modify_date: Option<String>,
    pub file_urls: String,
}

impl Row for DocumentDetail {
    const TABLE: &'static str = "document_details";
    const KEY_COLUMNS: &'static [&'static str] = &["object_id"];

    fn key(&self) -> Vec<String> {
        vec![self.object_id.clone()]
    }
}

impl DetailRecord for DocumentDetail {
    type Attributes = DocumentDetailAttributes;
    const KIND: ResourceKind = ResourceKind::Document;
    const INCLUDE: Option<&'static str> = Some("attachments");

    fn from_response(response: DetailResponse<DocumentDetailAttributes>) -> Self {
        let mut urls = Vec::new();
        collect_file_urls(response.data.attributes.file_formats.as_deref(), &mut urls);
        urls.extend(attachment_urls(&response.included));

        let a = response.data.attributes;
        Self {
            object_id: a.object_id,
            document_id: response.data.id,
            docket_id: a.docket_id,
            agency_id: a.agency_id,
            document_type: a.document_type,
            subtype: a.subtype,
            title: a.title,
            doc_abstract: a.doc_abstract,
            fr_doc_num: a.fr_doc_num,
            page_count: a.page_count,
            posted_date: a.posted_date,
            comment_start_date: a.comment_start_date,
            comment_end_date: a.comment_end_date,
            open_for_comment: a.open_for_comment,
            withdrawn: a.withdrawn,
            modify_date: a.modify_date,
            file_urls: urls.join(URL_DELIMITER),
        }
    }

    fn public_id(&self) -> &str {
        &self.document_id
    }
    fn object_id(&self) -> &str {
        &self.object_id
    }
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentHeader {
    pub comment_id: String,
    pub object_id: String,
    pub agency_id: Option<String>,
    pub document_type: Option<String>,
    pub highlighted_content: Option<String>,
    pub last_modified_date: DateTime<Utc>,
    pub posted_date: Option<String>,
    pub title: Option<String>,
    pub withdrawn: bool,
}

impl Row for CommentHeader {
    const TABLE: &'static str = "comment_headers";
    const KEY_COLUMNS: &'static [&'static str] = &["comment_id", "object_id"];

    fn key(&self) -> Vec<String> {
        vec![self.comment_id.clone(), self.object_id.clone()]
    }
}

impl HeaderRecord for CommentHeader {
    type Attributes = CommentAttributes;
    type Query = CommentQuery;
    const KIND: ResourceKind = ResourceKind::Comment;

    fn from_resource(resource: Resource<CommentAttributes>) -> Self {
        let a = resource.attributes;
        Self {
            comment_id: resource.id,
            object_id: a.object_id,
            agency_id: a.agency_id,
            document_type: a.document_type,
            highlighted_content: a.highlighted_content,
            last_modified_date: a.last_modified_date,
            posted_date: a.posted_date,
            title: a.title,
            withdrawn: a.withdrawn,
        }
    }

    fn public_id(&self) -> &str {
        &self.comment_id
    }
    fn object_id(&self) -> &str {
        &self.object_id
    }
    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentDetail {
    pub object_id: String,
    pub comment_id: String,
    pub comment_on_document_id: Option<String>,
    pub docket_id: Option<String>,
    pub agency_id: Option<String>,
    pub document_type: Option<String>,
    pub title: Option<String>,
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
    pub withdrawn: bool,
    pub reason_withdrawn: Option<String>,
    pub duplicate_comments: Option<i64>,
    pub tracking_nbr: Option<String>,
    pub attachment_urls: String,
}

impl Row for CommentDetail {
    const TABLE: &'static str = "comment_details";
    const KEY_COLUMNS: &'static [&'static str] = &["object_id"];

    fn key(&self) -> Vec<String> {
        vec![self.object_id.clone()]
    }
}

impl DetailRecord for CommentDetail {
    type Attributes = CommentDetailAttributes;
    const KIND: ResourceKind = ResourceKind::Comment;
    const INCLUDE: Option<&'static str> = Some("attachments");

    fn from_response(response: DetailResponse<CommentDetailAttributes>) -> Self {
        let attachment_urls = attachment_urls(&response.included).join(URL_DELIMITER);
        let a = response.data.attributes;
        Self {
            object_id: a.object_id,
            comment_id: response.data.id,
            comment_on_document_id: a.comment_on_document_id,
            docket_id: a.docket_id,
            agency_id: a.agency_id,
            document_type: a.document_type,
            title: a.title,
            comment: a.comment,
            first_name: a.first_name,
            last_name: a.last_name,
            organization: a.organization,
            city: a.city,
            state_province_region: a.state_province_region,
            country: a.country,
            category: a.category,
            posted_date: a.posted_date,
            receive_date: a.receive_date,
            modify_date: a.modify_date,
            withdrawn: a.withdrawn,
            reason_withdrawn: a.reason_withdrawn,
            duplicate_comments: a.duplicate_comments,
            tracking_nbr: a.tracking_nbr,
            attachment_urls,
        }
    }

    fn public_id(&self) -> &str {
        &self.comment_id
    }
    fn object_id(&self) -> &str {
        &self.object_id
    }
}

/// Download links of every side-loaded attachment, in discovery order.
pub fn attachment_urls(included: &[Included]) -> Vec<String> {
    let mut urls = Vec::new();
    for item in included.iter().filter(|i| i.kind == "attachments") {
        collect_file_urls(item.attributes.file_formats.as_deref(), &mut urls);
    }
    urls
}

fn collect_file_urls(formats: Option<&[FileFormat]>, urls: &mut Vec<String>) {
    for format in formats.unwrap_or_default() {
        if !format.file_url.is_empty() {
            urls.push(format.file_url.clone());
        }
    }
}
