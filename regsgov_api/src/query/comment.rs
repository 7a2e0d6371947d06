use url::Url;

use crate::types::{ObjectId, ResourceKind};

use super::common::{Query, QueryCommon};

/// Query builder for `GET /comments`.
#[derive(Debug, Clone, Default)]
pub struct CommentQuery {
    pub common: QueryCommon,
    /// Object ID of the document (or docket) being commented on.
    pub comment_on: Option<ObjectId>,
}

impl Query for CommentQuery {
    const KIND: ResourceKind = ResourceKind::Comment;

    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        if let Some(comment_on) = &self.comment_on {
            url.query_pairs_mut()
                .append_pair("filter[commentOnId]", comment_on.as_str());
        }
        url
    }
}

impl CommentQuery {
    /// Restricts results to comments on the given object. Takes an
    /// [`ObjectId`] because document IDs are not unique.
    pub fn with_comment_on(mut self, object_id: &ObjectId) -> Self {
        self.comment_on = Some(object_id.clone());
        self
    }
}
