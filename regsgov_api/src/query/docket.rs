use url::Url;

use crate::types::ResourceKind;

use super::common::{Query, QueryCommon};

/// Query builder for `GET /dockets`.
#[derive(Debug, Clone, Default)]
pub struct DocketQuery {
    pub common: QueryCommon,
    /// `Rulemaking` or `Nonrulemaking`.
    pub docket_type: Option<String>,
}

impl Query for DocketQuery {
    const KIND: ResourceKind = ResourceKind::Docket;

    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        if let Some(docket_type) = &self.docket_type {
            url.query_pairs_mut()
                .append_pair("filter[docketType]", docket_type);
        }
        url
    }
}

impl DocketQuery {
    pub fn with_docket_type(mut self, docket_type: &str) -> Self {
        self.docket_type = Some(docket_type.to_string());
        self
    }
}
