//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod file_transfer;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use file_transfer::{FileTransfer, RawUpload, UploadDescriptor};
pub use repository::{AttachmentRepository, MemberRepository, PostRepository, ReadRepository};
