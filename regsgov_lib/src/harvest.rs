//! Paginator and cursor advancer.
//!
//! A single query can reach at most `max_pages × page_size` records (5,000
//! with the API's limits). [`Harvester::paginate`] walks one such pass;
//! [`Harvester::harvest`] chains passes by re-issuing the query with
//! `lastModifiedDate >= cursor`, where the cursor is the last record's UTC
//! timestamp converted to Eastern wall-clock time. The boundary is inclusive,
//! so records at the cursor instant appear in both passes and are removed by
//! the deduplicator.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use regsgov_api::types::{ListResponse, ResourceKind};
use regsgov_api::{Client, Query, SortDirection, SortField, LAST_MODIFIED_FORMAT};

use crate::cancel::CancelFlag;
use crate::eastern::to_eastern;
use crate::error::{HarvestError, Stage};
use crate::quota::{GateError, QuotaGate};
use crate::records::HeaderRecord;
use crate::validation::{validate_max_pages, validate_page_size, MAX_PAGES, MAX_PAGE_SIZE};

/// Page size and page count for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub page_size: u32,
    pub max_pages: u32,
}

impl PageLimits {
    pub fn new(page_size: u32, max_pages: u32) -> Result<Self, HarvestError> {
        Ok(Self {
            page_size: validate_page_size(page_size)?,
            max_pages: validate_max_pages(max_pages)?,
        })
    }

    /// Most records a single pass can return.
    pub fn pass_capacity(&self) -> u64 {
        u64::from(self.page_size) * u64::from(self.max_pages)
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_pages: MAX_PAGES,
        }
    }
}

/// Result of walking one query's pages.
#[derive(Debug, Clone)]
pub struct Pass<H> {
    pub records: Vec<H>,
    /// The last permitted page was full, so more records may exist.
    pub capped: bool,
    /// Last-modified time of the final record.
    pub cursor: Option<DateTime<Utc>>,
    pub pages: u32,
}

/// Progress events for UI feedback.
#[derive(Debug, Clone)]
pub enum Progress {
    Page {
        kind: ResourceKind,
        pass: u32,
        page: u32,
        records: usize,
    },
    Detail {
        kind: ResourceKind,
        done: usize,
        total: usize,
    },
}

pub type ProgressFn = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Issues list and detail requests through a [`QuotaGate`].
pub struct Harvester {
    pub(crate) client: Client,
    pub(crate) gate: QuotaGate,
    pub(crate) limits: PageLimits,
    pub(crate) cancel: CancelFlag,
    progress: Option<ProgressFn>,
}

impl Harvester {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            gate: QuotaGate::default(),
            limits: PageLimits::default(),
            cancel: CancelFlag::new(),
            progress: None,
        }
    }

    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the quota gate. The harvester's cancel flag is applied to it.
    pub fn with_gate(mut self, gate: QuotaGate) -> Self {
        self.gate = gate.with_cancel(self.cancel.clone());
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.gate = self.gate.with_cancel(cancel.clone());
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn gate(&self) -> &QuotaGate {
        &self.gate
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    pub(crate) fn report(&self, event: Progress) {
        if let Some(progress) = &self.progress {
            progress(&event);
        }
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), HarvestError> {
        if self.cancel.is_cancelled() {
            Err(HarvestError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Walk pages 1..=max_pages of `query` until a short page, the API's
    /// last page, or the page cap.
    pub async fn paginate<H: HeaderRecord>(
        &self,
        query: &H::Query,
    ) -> Result<Pass<H>, HarvestError> {
        self.paginate_pass(query, 1).await
    }

    async fn paginate_pass<H: HeaderRecord>(
        &self,
        query: &H::Query,
        pass: u32,
    ) -> Result<Pass<H>, HarvestError> {
        let mut records = Vec::new();
        let mut pages = 0;
        let mut capped = false;

        for page in 1..=self.limits.max_pages {
            self.check_cancelled()?;

            let paged = query
                .clone()
                .with_page(page)
                .with_page_size(self.limits.page_size);
            let label = format!("{} page {}", H::KIND, page);
            let client = &self.client;
            let paged = &paged;
            let resp: ListResponse<H::Attributes> = self
                .gate
                .run(&label, move || client.list(paged))
                .await
                .map_err(|e| gate_error(e, H::KIND, format!("page {}", page), Stage::Headers))?;

            pages = page;
            let count = resp.data.len();
            records.extend(resp.data.into_iter().map(H::from_resource));
            tracing::debug!(
                "{} pass {} page {}: {} records ({} total)",
                H::KIND,
                pass,
                page,
                count,
                records.len()
            );
            self.report(Progress::Page {
                kind: H::KIND,
                pass,
                page,
                records: records.len(),
            });

            if (count as u32) < self.limits.page_size || resp.meta.last_page {
                break;
            }
            if page == self.limits.max_pages {
                capped = true;
            }
        }

        let cursor = records.last().map(|r| r.last_modified());
        Ok(Pass {
            records,
            capped,
            cursor,
            pages,
        })
    }

    /// Retrieve every record matching `query`, advancing the last-modified
    /// cursor past the per-query cap.
    ///
    /// The query is forced to ascending `lastModifiedDate` order. The output
    /// is the concatenation of all passes and may repeat records that share a
    /// boundary timestamp.
    pub async fn harvest<H: HeaderRecord>(
        &self,
        query: &H::Query,
    ) -> Result<Vec<H>, HarvestError> {
        let base = query
            .clone()
            .with_sort_field(SortField::LastModifiedDate)
            .with_sort_direction(SortDirection::Asc);

        let seed = base.common().modified_from;
        let mut previous: Option<DateTime<Utc>> = None;
        let mut current = base.clone();
        let mut all = Vec::new();
        let mut pass_no = 1;

        loop {
            let pass = self.paginate_pass::<H>(&current, pass_no).await?;
            all.extend(pass.records);

            let cursor = match (pass.capped, pass.cursor) {
                (true, Some(cursor)) => cursor,
                _ => break,
            };
            let next = to_eastern(cursor);
            if !cursor_advanced(previous, seed, cursor) {
                return Err(HarvestError::CursorStalled {
                    cursor: next.format(LAST_MODIFIED_FORMAT).to_string(),
                });
            }

            tracing::info!(
                "{} pass {} capped after {} records; continuing from lastModifiedDate >= {}",
                H::KIND,
                pass_no,
                all.len(),
                next.format(LAST_MODIFIED_FORMAT)
            );
            previous = Some(cursor);
            current = base.clone().with_modified_from(next);
            pass_no += 1;
        }

        tracing::info!(
            "Retrieved {} {} headers in {} pass(es)",
            all.len(),
            H::KIND,
            pass_no
        );
        Ok(all)
    }
}

/// Whether a capped pass ending at `cursor` moved the harvest forward.
///
/// Later passes compare UTC instants: Eastern wall-clock time repeats an hour
/// when daylight saving ends, so 05:50Z (01:50 EDT) precedes 06:35Z (01:35
/// EST). The first pass can only be compared with the caller's own Eastern
/// `modified_from` seed.
fn cursor_advanced(
    previous: Option<DateTime<Utc>>,
    seed: Option<NaiveDateTime>,
    cursor: DateTime<Utc>,
) -> bool {
    match previous {
        Some(previous) => cursor > previous,
        None => seed.map_or(true, |seed| to_eastern(cursor) > seed),
    }
}

pub(crate) fn gate_error(
    err: GateError,
    kind: ResourceKind,
    target: String,
    stage: Stage,
) -> HarvestError {
    match err {
        GateError::Cancelled => HarvestError::Cancelled,
        GateError::Api(source) => HarvestError::request(kind, target, stage, source),
    }
}
