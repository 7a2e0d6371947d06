//! Detail expansion: one gated request per header, tolerant of bad items.

use regsgov_api::types::ObjectId;

use crate::error::{HarvestError, Stage};
use crate::harvest::{gate_error, Harvester, Progress};
use crate::quota::GateError;
use crate::records::{DetailRecord, HeaderRecord};

/// Identifies one item to expand.
///
/// Requests go to the public-ID route; when the object ID is already known
/// the response must carry the same one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailKey {
    pub public_id: String,
    pub object_id: Option<ObjectId>,
}

impl DetailKey {
    pub fn new(public_id: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            object_id: None,
        }
    }

    pub fn with_object_id(mut self, object_id: ObjectId) -> Self {
        self.object_id = Some(object_id);
        self
    }

    pub fn from_header<H: HeaderRecord>(header: &H) -> Self {
        let key = Self::new(header.public_id());
        match header.object_id() {
            "" => key,
            id => key.with_object_id(ObjectId::new(id)),
        }
    }
}

/// An item that could not be expanded, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub id: String,
    pub reason: String,
}

/// Detail records in input order, plus the items that were skipped.
#[derive(Debug, Clone)]
pub struct DetailBatch<D> {
    pub records: Vec<D>,
    pub skipped: Vec<SkippedItem>,
}

impl Harvester {
    /// Fetch the detail record for every key.
    ///
    /// A malformed payload, a 404 for one item, or a detail whose object ID
    /// is missing or unexpected skips that item. Authentication, network and
    /// other HTTP failures abort the batch.
    pub async fn fetch_details<D: DetailRecord>(
        &self,
        keys: &[DetailKey],
    ) -> Result<DetailBatch<D>, HarvestError> {
        let mut records = Vec::with_capacity(keys.len());
        let mut skipped = Vec::new();

        for (i, key) in keys.iter().enumerate() {
            self.check_cancelled()?;
            match self.fetch_detail::<D>(key, Stage::Details).await? {
                Ok(record) => records.push(record),
                Err(skip) => {
                    tracing::warn!(
                        "Skipping {} {}: {}",
                        D::KIND,
                        skip.id,
                        skip.reason
                    );
                    skipped.push(skip);
                }
            }
            self.report(Progress::Detail {
                kind: D::KIND,
                done: i + 1,
                total: keys.len(),
            });
        }

        tracing::info!(
            "Fetched {} {} details ({} skipped)",
            records.len(),
            D::KIND,
            skipped.len()
        );
        Ok(DetailBatch { records, skipped })
    }

    /// Fetch one detail record. The inner `Err` is an item-scoped failure.
    pub(crate) async fn fetch_detail<D: DetailRecord>(
        &self,
        key: &DetailKey,
        stage: Stage,
    ) -> Result<Result<D, SkippedItem>, HarvestError> {
        let label = format!("{} {}", D::KIND, key.public_id);
        let client = &self.client;
        let id = key.public_id.as_str();
        let result = self
            .gate
            .run(&label, move || client.detail::<D::Attributes>(D::KIND, id, D::INCLUDE))
            .await;

        let skip = |reason: String| SkippedItem {
            id: key.public_id.clone(),
            reason,
        };

        match result {
            Ok(resp) => {
                let record = D::from_response(resp);
                if record.object_id().is_empty() {
                    return Ok(Err(skip("detail has no objectId".to_string())));
                }
                if let Some(expected) = &key.object_id {
                    if record.object_id() != expected.as_str() {
                        return Ok(Err(skip(format!(
                            "object ID {} does not match expected {}",
                            record.object_id(),
                            expected
                        ))));
                    }
                }
                Ok(Ok(record))
            }
            Err(GateError::Api(e)) if e.is_item_scoped() => Ok(Err(skip(e.to_string()))),
            Err(e) => Err(gate_error(e, D::KIND, key.public_id.clone(), stage)),
        }
    }
}
