//! Resource kinds and the internal object identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three resource families exposed by the v4 API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Docket,
    Document,
    Comment,
}

impl ResourceKind {
    /// Endpoint path for the list and detail routes.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Docket => "/dockets",
            Self::Document => "/documents",
            Self::Comment => "/comments",
        }
    }

    /// Name of the public identifier column for this kind.
    pub fn id_field(&self) -> &'static str {
        match self {
            Self::Docket => "docket_id",
            Self::Document => "document_id",
            Self::Comment => "comment_id",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Docket => "docket",
            Self::Document => "document",
            Self::Comment => "comment",
        };
        f.write_str(s)
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().trim_end_matches('s') {
            "docket" => Ok(Self::Docket),
            "document" => Ok(Self::Document),
            "comment" => Ok(Self::Comment),
            other => Err(format!("unknown resource kind '{}'", other)),
        }
    }
}

/// Internal stable identifier of a document or comment.
///
/// Distinct from the public document/comment ID. Comment queries are filtered
/// by the object ID of the document they comment on, never by its document ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
