//! JSON:API envelopes shared by every v4 endpoint.

use serde::{Deserialize, Serialize};

use super::attachment::AttachmentAttributes;

/// One resource object: `{ "id", "type", "attributes", "links" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource<A> {
    /// Public identifier (docket ID, document ID or comment ID).
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: A,
    #[serde(default)]
    pub links: Option<Links>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
}

/// Paging block returned alongside every list response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMeta {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub number_of_elements: i64,
    pub page_number: i64,
    pub page_size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first_page: bool,
    pub last_page: bool,
}

/// Response from a list endpoint (`/dockets`, `/documents`, `/comments`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<A> {
    pub data: Vec<Resource<A>>,
    #[serde(default)]
    pub meta: PageMeta,
}

/// Response from a detail endpoint, with optional side-loaded resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse<A> {
    pub data: Resource<A>,
    #[serde(default)]
    pub included: Vec<Included>,
}

/// A side-loaded resource from `?include=attachments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Included {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: AttachmentAttributes,
}
