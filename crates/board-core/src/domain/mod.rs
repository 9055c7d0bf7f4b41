//! Domain entities - the core business objects.

mod attachment;
mod member;
mod post;

pub use attachment::{Attachment, AttachmentId, PathDescriptor};
pub use member::{Member, Principal};
pub use post::{MAX_TITLE_LEN, NewPost, Post, PostEdit, PostId, validate_content};
