mod client;
mod errors;
mod query;
pub mod types;
pub use self::client::Client;
pub use self::errors::Error;
pub use self::query::{
    CommentQuery, DocketQuery, DocumentQuery, Query, QueryCommon, SortDirection, SortField,
    LAST_MODIFIED_FORMAT, POSTED_DATE_FORMAT,
};
