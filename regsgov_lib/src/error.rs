//! Error types for the retrieval engine.

use std::fmt;

use regsgov_api::types::ResourceKind;

use crate::sink::SinkError;

/// Pipeline stage a failure happened in, for error context and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Walking a paginated list endpoint.
    Headers,
    /// Looking up a document's object ID through its detail route.
    ObjectId,
    /// Expanding headers into detail records.
    Details,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Headers => "header",
            Self::ObjectId => "object-id",
            Self::Details => "detail",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by the engine to its caller.
///
/// Quota exhaustion never appears here: the quota gate absorbs it.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    /// A request failed in a way that makes the rest of the stage pointless
    /// (rejected key, unreachable network, malformed list response).
    #[error("{stage} request for {kind} {target} failed: {source}")]
    Request {
        kind: ResourceKind,
        target: String,
        stage: Stage,
        #[source]
        source: regsgov_api::Error,
    },
    /// A document ID resolved to more than one object ID.
    #[error("document {document_id} resolves to {} object IDs: {}", .object_ids.len(), .object_ids.join(", "))]
    AmbiguousIdentifier {
        document_id: String,
        object_ids: Vec<String>,
    },
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: String },
    /// A capped pass ended on the timestamp it started from, so advancing the
    /// cursor would re-issue the same query.
    #[error("cursor stalled at {cursor}: more than one full pass of records share this last-modified time")]
    CursorStalled { cursor: String },
    #[error("cancelled")]
    Cancelled,
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Store(#[from] SinkError),
}

impl HarvestError {
    pub(crate) fn request(
        kind: ResourceKind,
        target: impl Into<String>,
        stage: Stage,
        source: regsgov_api::Error,
    ) -> Self {
        Self::Request {
            kind,
            target: target.into(),
            stage,
            source,
        }
    }
}
