//! Docket → documents → comments → comment details.
//!
//! Each stage runs to completion and is written to the sink before the next
//! one starts, so a fatal error later on leaves earlier stages persisted.

use std::fmt;

use regsgov_api::types::{ObjectId, ResourceKind};
use regsgov_api::{CommentQuery, DocumentQuery, Query};

use crate::dedup::{dedup_headers, Deduped};
use crate::details::{DetailBatch, DetailKey, SkippedItem};
use crate::error::{HarvestError, Stage};
use crate::harvest::Harvester;
use crate::records::{CommentDetail, CommentHeader, DetailRecord, DocumentDetail, DocumentHeader, HeaderRecord};
use crate::sink::Sink;
use crate::validation::{validate_docket_id, validate_document_id};

/// A problem confined to one document or comment; the run continued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialFailure {
    /// A document ID mapped to several object IDs, so its comments were not fetched.
    AmbiguousIdentifier {
        document_id: String,
        object_ids: Vec<String>,
    },
    Skipped {
        kind: ResourceKind,
        item: SkippedItem,
    },
}

impl fmt::Display for PartialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousIdentifier {
                document_id,
                object_ids,
            } => write!(
                f,
                "document {} has {} object IDs ({}); skipped",
                document_id,
                object_ids.len(),
                object_ids.join(", ")
            ),
            Self::Skipped { kind, item } => {
                write!(f, "{} {} skipped: {}", kind, item.id, item.reason)
            }
        }
    }
}

/// Counts for one compound run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub documents_found: usize,
    pub comments_found: usize,
    pub comments_retrieved: usize,
    pub duplicates_removed: usize,
    pub documents_written: usize,
    pub document_details_written: usize,
    pub comment_headers_written: usize,
    pub comment_details_written: usize,
    pub failures: Vec<PartialFailure>,
}

/// Outcome of resolving one document ID to its object ID.
enum Resolution {
    Resolved {
        header: DocumentHeader,
        detail: DocumentDetail,
    },
    Ambiguous(Vec<String>),
    Skipped(SkippedItem),
}

pub struct Pipeline {
    harvester: Harvester,
}

impl Pipeline {
    pub fn new(harvester: Harvester) -> Self {
        Self { harvester }
    }

    pub fn harvester(&self) -> &Harvester {
        &self.harvester
    }

    /// Every header matching `query`, deduplicated.
    pub async fn fetch_headers<H: HeaderRecord>(
        &self,
        query: &H::Query,
    ) -> Result<Deduped<H>, HarvestError> {
        let headers = self.harvester.harvest::<H>(query).await?;
        Ok(dedup_headers(headers))
    }

    /// Detail records for `keys`, skipping items that fail on their own.
    pub async fn fetch_details<D: DetailRecord>(
        &self,
        keys: &[DetailKey],
    ) -> Result<DetailBatch<D>, HarvestError> {
        self.harvester.fetch_details::<D>(keys).await
    }

    /// Retrieve every document in `docket_id`, every comment on those
    /// documents, and every comment's detail record.
    ///
    /// Documents whose ID maps to more than one object ID are reported in
    /// `failures` and their comments are not fetched.
    pub async fn docket_comments<S: Sink>(
        &self,
        docket_id: &str,
        sink: &mut S,
    ) -> Result<PipelineReport, HarvestError> {
        let docket_id = validate_docket_id(docket_id)?;
        let mut report = PipelineReport::default();

        tracing::info!("Resolving documents for docket {}", docket_id);
        let query = DocumentQuery::default().with_docket_id(&docket_id);
        let documents = self.fetch_headers::<DocumentHeader>(&query).await?;
        report.duplicates_removed += documents.removed;

        // Headers that already carry an object ID are stored before any detail
        // lookup; the rest wait for resolution.
        let listed: Vec<DocumentHeader> = documents
            .records
            .iter()
            .filter(|h| !h.object_id.is_empty())
            .cloned()
            .collect();
        report.documents_written = sink.upsert(&listed)?;

        let groups = group_by_document(documents.records);
        report.documents_found = groups.len();
        tracing::info!(
            "Found {} documents in docket {}",
            report.documents_found,
            docket_id
        );

        let mut headers = Vec::new();
        let mut details = Vec::new();
        for (document_id, group) in groups {
            match self.resolve_document(&document_id, group.clone()).await? {
                Resolution::Resolved { header, detail } => {
                    headers.push(header);
                    details.push(detail);
                }
                Resolution::Ambiguous(object_ids) => {
                    tracing::warn!(
                        "Document {} maps to {} object IDs; skipping its comments",
                        document_id,
                        object_ids.len()
                    );
                    headers.extend(group);
                    report.failures.push(PartialFailure::AmbiguousIdentifier {
                        document_id,
                        object_ids,
                    });
                }
                Resolution::Skipped(item) => {
                    tracing::warn!("Skipping document {}: {}", item.id, item.reason);
                    headers.extend(group);
                    report.failures.push(PartialFailure::Skipped {
                        kind: ResourceKind::Document,
                        item,
                    });
                }
            }
        }

        report.documents_written += sink.upsert(&headers)?;
        report.document_details_written = sink.upsert(&details)?;
        tracing::info!(
            "Wrote {} document headers, {} document details",
            report.documents_written,
            report.document_details_written
        );

        let object_ids: Vec<ObjectId> = details
            .iter()
            .map(|d| ObjectId::new(d.object_id.as_str()))
            .collect();
        self.comment_stages(&object_ids, sink, &mut report).await?;
        Ok(report)
    }

    /// Retrieve every comment on one document, and each comment's detail.
    ///
    /// Unlike [`Pipeline::docket_comments`], an ambiguous document ID is fatal.
    pub async fn document_comments<S: Sink>(
        &self,
        document_id: &str,
        sink: &mut S,
    ) -> Result<PipelineReport, HarvestError> {
        let document_id = validate_document_id(document_id)?;
        let mut report = PipelineReport::default();

        tracing::info!("Looking up document {}", document_id);
        let query = DocumentQuery::default().with_search_term(&document_id);
        let found = self.fetch_headers::<DocumentHeader>(&query).await?;
        report.duplicates_removed += found.removed;

        let group: Vec<DocumentHeader> = found
            .records
            .into_iter()
            .filter(|h| h.document_id == document_id)
            .collect();
        if group.is_empty() {
            return Err(HarvestError::NotFound {
                kind: ResourceKind::Document,
                id: document_id,
            });
        }
        report.documents_found = 1;

        let (header, detail) = match self.resolve_document(&document_id, group).await? {
            Resolution::Resolved { header, detail } => (header, detail),
            Resolution::Ambiguous(object_ids) => {
                return Err(HarvestError::AmbiguousIdentifier {
                    document_id,
                    object_ids,
                })
            }
            Resolution::Skipped(item) => {
                tracing::warn!("Skipping document {}: {}", item.id, item.reason);
                report.failures.push(PartialFailure::Skipped {
                    kind: ResourceKind::Document,
                    item,
                });
                return Ok(report);
            }
        };

        report.documents_written = sink.upsert(std::slice::from_ref(&header))?;
        report.document_details_written = sink.upsert(std::slice::from_ref(&detail))?;

        let object_id = ObjectId::new(detail.object_id.as_str());
        self.comment_stages(std::slice::from_ref(&object_id), sink, &mut report)
            .await?;
        Ok(report)
    }

    /// Map one document ID to exactly one object ID.
    ///
    /// The header list must agree on at most one object ID, and the
    /// document's detail record must carry that same ID.
    async fn resolve_document(
        &self,
        document_id: &str,
        group: Vec<DocumentHeader>,
    ) -> Result<Resolution, HarvestError> {
        let mut listed: Vec<String> = Vec::new();
        for header in &group {
            if !header.object_id.is_empty() && !listed.contains(&header.object_id) {
                listed.push(header.object_id.clone());
            }
        }
        if listed.len() > 1 {
            return Ok(Resolution::Ambiguous(listed));
        }

        self.harvester.check_cancelled()?;
        let key = DetailKey::new(document_id);
        let detail = match self
            .harvester
            .fetch_detail::<DocumentDetail>(&key, Stage::ObjectId)
            .await?
        {
            Ok(detail) => detail,
            Err(item) => return Ok(Resolution::Skipped(item)),
        };

        if let Some(expected) = listed.first() {
            if *expected != detail.object_id {
                listed.push(detail.object_id.clone());
                return Ok(Resolution::Ambiguous(listed));
            }
        }

        let Some(mut header) = group.into_iter().next() else {
            return Err(HarvestError::NotFound {
                kind: ResourceKind::Document,
                id: document_id.to_string(),
            });
        };
        if header.object_id.is_empty() {
            tracing::debug!(
                "Document {} resolved to object ID {}",
                document_id,
                detail.object_id
            );
            header.object_id = detail.object_id.clone();
        }
        Ok(Resolution::Resolved { header, detail })
    }

    /// Harvest, persist, and expand the comments on each object ID.
    async fn comment_stages<S: Sink>(
        &self,
        object_ids: &[ObjectId],
        sink: &mut S,
        report: &mut PipelineReport,
    ) -> Result<(), HarvestError> {
        let mut comments = Vec::new();
        for object_id in object_ids {
            let query = CommentQuery::default().with_comment_on(object_id);
            let found = self.harvester.harvest::<CommentHeader>(&query).await?;
            tracing::info!("Found {} comment headers on {}", found.len(), object_id);
            comments.extend(found);
        }

        let deduped = dedup_headers(comments);
        report.duplicates_removed += deduped.removed;
        report.comments_found = deduped.records.len();
        report.comment_headers_written = sink.upsert(&deduped.records)?;
        tracing::info!(
            "Comment headers: {} found, {} written, {} duplicates removed",
            report.comments_found,
            report.comment_headers_written,
            deduped.removed
        );

        let keys: Vec<DetailKey> = deduped.records.iter().map(DetailKey::from_header).collect();
        let batch = self.harvester.fetch_details::<CommentDetail>(&keys).await?;
        report.comments_retrieved = batch.records.len();
        report.comment_details_written = sink.upsert(&batch.records)?;
        report
            .failures
            .extend(batch.skipped.into_iter().map(|item| PartialFailure::Skipped {
                kind: ResourceKind::Comment,
                item,
            }));
        tracing::info!(
            "Comment details: {} retrieved, {} written",
            report.comments_retrieved,
            report.comment_details_written
        );
        Ok(())
    }
}

/// Group headers by document ID, keeping first-seen order.
fn group_by_document(headers: Vec<DocumentHeader>) -> Vec<(String, Vec<DocumentHeader>)> {
    let mut groups: Vec<(String, Vec<DocumentHeader>)> = Vec::new();
    for header in headers {
        match groups.iter_mut().find(|(id, _)| *id == header.document_id) {
            Some((_, group)) => group.push(header),
            None => groups.push((header.document_id.clone(), vec![header])),
        }
    }
    groups
}
