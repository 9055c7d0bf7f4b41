use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type AttachmentId = i64;

/// Where an uploaded file lives: the storage group, the path assigned by the
/// file transfer layer, and the name the client uploaded it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathDescriptor {
    pub group_name: String,
    pub stored_path: String,
    pub original_name: String,
}

/// Metadata record for one file belonging to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub post_id: super::PostId,
    pub path: PathDescriptor,
    pub created_at: DateTime<Utc>,
}
