use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Attachment, AttachmentId, PathDescriptor};
use crate::error::DomainError;

pub type PostId = i64;

/// Longest title accepted on create or update, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Post entity - a bulletin board entry together with the attachments it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered by attachment id.
    pub attachments: Vec<Attachment>,
}

impl Post {
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id == user_id
    }

    pub fn attachment(&self, id: AttachmentId) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.id == id)
    }

    /// Start an edit of this post's content. The author is never part of an edit.
    pub fn edit(&self, title: String, body: String) -> PostEdit {
        PostEdit {
            post_id: self.id,
            title,
            body,
            updated_at: Utc::now(),
            removed: Vec::new(),
            added: Vec::new(),
        }
    }
}

/// A post that has not been stored yet, with the paths of the files it will own.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub author_id: String,
    pub attachments: Vec<PathDescriptor>,
}

impl NewPost {
    pub fn new(title: String, body: String, author_id: String) -> Self {
        Self {
            title,
            body,
            author_id,
            attachments: Vec::new(),
        }
    }

    pub fn attach(&mut self, path: PathDescriptor) {
        self.attachments.push(path);
    }
}

/// Pending changes to a stored post, committed as a single unit of work.
#[derive(Debug, Clone)]
pub struct PostEdit {
    pub post_id: PostId,
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
    /// Attachment records to delete. Their files are removed only after commit.
    pub removed: Vec<Attachment>,
    pub added: Vec<PathDescriptor>,
}

impl PostEdit {
    pub fn detach(&mut self, attachment: Attachment) {
        if !self.removed.iter().any(|a| a.id == attachment.id) {
            self.removed.push(attachment);
        }
    }

    pub fn attach(&mut self, path: PathDescriptor) {
        self.added.push(path);
    }

    pub fn removed_ids(&self) -> Vec<AttachmentId> {
        self.removed.iter().map(|a| a.id).collect()
    }
}

/// Check a title/body pair before it reaches the store.
pub fn validate_content(title: &str, _body: &str) -> Result<(), DomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("Title must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(id: AttachmentId, post_id: PostId) -> Attachment {
        Attachment {
            id,
            post_id,
            path: PathDescriptor {
                group_name: "board".to_string(),
                stored_path: format!("board/2024/01/01/{}", id),
                original_name: format!("file-{}.txt", id),
            },
            created_at: Utc::now(),
        }
    }

    fn post() -> Post {
        let now = Utc::now();
        Post {
            id: 7,
            title: "hello".to_string(),
            body: "world".to_string(),
            author_id: "u1".to_string(),
            created_at: now,
            updated_at: now,
            attachments: vec![attachment(1, 7), attachment(2, 7)],
        }
    }

    #[test]
    fn test_attachment_lookup() {
        let post = post();
        assert_eq!(post.attachment(2).map(|a| a.id), Some(2));
        assert!(post.attachment(3).is_none());
    }

    #[test]
    fn test_edit_keeps_post_identity() {
        let post = post();
        let edit = post.edit("new".to_string(), "body".to_string());
        assert_eq!(edit.post_id, 7);
        assert!(edit.removed.is_empty());
        assert!(edit.added.is_empty());
    }

    #[test]
    fn test_detach_ignores_duplicates() {
        let post = post();
        let mut edit = post.edit("t".to_string(), "b".to_string());
        edit.detach(post.attachments[0].clone());
        edit.detach(post.attachments[0].clone());
        assert_eq!(edit.removed_ids(), vec![1]);
    }

    #[test]
    fn test_validate_content() {
        assert!(validate_content("hello", "").is_ok());
        assert!(matches!(
            validate_content("   ", "body"),
            Err(DomainError::Validation(_))
        ));
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(matches!(
            validate_content(&long, "body"),
            Err(DomainError::Validation(_))
        ));
    }
}
