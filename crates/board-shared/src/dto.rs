//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Query string of `GET /api/posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
}

/// Query string of `GET /api/posts/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPostsQuery {
    #[serde(default)]
    pub keyword: String,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

/// Returned after a post is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreatedResponse {
    pub id: i64,
}

/// Multipart field names accepted by the create and update endpoints.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const BODY: &str = "body";
    pub const FILES: &str = "files";
    pub const DELETE_FILES: &str = "del_files";
}
