use url::Url;

use crate::types::ResourceKind;

use super::common::{Query, QueryCommon};

/// Query builder for `GET /documents`.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub common: QueryCommon,
    pub docket_id: Option<String>,
    /// `Notice`, `Rule`, `Proposed Rule`, `Supporting & Related Material` or `Other`.
    pub document_types: Vec<String>,
    pub fr_doc_num: Option<String>,
}

impl Query for DocumentQuery {
    const KIND: ResourceKind = ResourceKind::Document;

    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        if let Some(docket_id) = &self.docket_id {
            url.query_pairs_mut()
                .append_pair("filter[docketId]", docket_id);
        }
        if !self.document_types.is_empty() {
            url.query_pairs_mut()
                .append_pair("filter[documentType]", &self.document_types.join(","));
        }
        if let Some(fr_doc_num) = &self.fr_doc_num {
            url.query_pairs_mut()
                .append_pair("filter[frDocNum]", fr_doc_num);
        }
        url
    }
}

impl DocumentQuery {
    pub fn with_docket_id(mut self, docket_id: &str) -> Self {
        self.docket_id = Some(docket_id.to_string());
        self
    }

    pub fn with_document_type(mut self, document_type: &str) -> Self {
        self.document_types.push(document_type.to_string());
        self
    }
    pub fn with_document_types(mut self, document_types: &[String]) -> Self {
        self.document_types.extend_from_slice(document_types);
        self
    }

    pub fn with_fr_doc_num(mut self, fr_doc_num: &str) -> Self {
        self.fr_doc_num = Some(fr_doc_num.to_string());
        self
    }
}
