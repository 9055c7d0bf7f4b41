use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Post;

/// A registered member. Only used as the ownership reference of posts;
/// the member lifecycle is managed elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(user_id: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            nickname: nickname.into(),
            created_at: Utc::now(),
        }
    }
}

/// The authenticated identity making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// Whether this principal authored the given post.
    pub fn owns(&self, post: &Post) -> bool {
        post.is_authored_by(&self.user_id)
    }
}
