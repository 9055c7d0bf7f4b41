//! Application services - use cases built on top of the ports.

mod post_service;
mod views;

pub use post_service::{CreatePostRequest, PostService, UPLOAD_GROUP, UpdatePostRequest};
pub use views::{AttachmentView, PostDetail, PostSummary};
