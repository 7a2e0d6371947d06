mod envelope;
pub use self::envelope::{DetailResponse, Included, Links, ListResponse, PageMeta, Resource};

mod kind;
pub use self::kind::{ObjectId, ResourceKind};

mod attachment;
pub use self::attachment::{AttachmentAttributes, FileFormat};

mod docket;
pub use self::docket::{DocketAttributes, DocketDetailAttributes};

mod document;
pub use self::document::{DocumentAttributes, DocumentDetailAttributes};

mod comment;
pub use self::comment::{CommentAttributes, CommentDetailAttributes};
