mod common;
pub use self::common::{
    Query, QueryCommon, SortDirection, SortField, LAST_MODIFIED_FORMAT, POSTED_DATE_FORMAT,
};

mod docket;
pub use self::docket::DocketQuery;

mod document;
pub use self::document::DocumentQuery;

mod comment;
pub use self::comment::CommentQuery;
