use async_trait::async_trait;

use crate::domain::{Attachment, AttachmentId, Member, NewPost, Post, PostEdit, PostId};
use crate::error::RepoError;
use crate::paging::{Page, PageRequest};

/// Generic read-only lookup by primary key.
#[async_trait]
pub trait ReadRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// Post store. Posts are loaded together with their attachments.
///
/// Every mutating method is a single transaction: either all of its rows are
/// written or none are.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError>;

    /// One page of posts, newest first.
    async fn find_page(&self, page: &PageRequest) -> Result<Page<Post>, RepoError>;

    /// Like `find_page`, restricted to posts whose title contains `keyword`.
    async fn search_by_title(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    /// Insert the post and one attachment record per path.
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Commit an edit: update the post row, drop removed attachment rows,
    /// insert added ones.
    async fn apply(&self, edit: PostEdit) -> Result<Post, RepoError>;

    /// Delete the post's attachment rows, then the post itself.
    async fn delete(&self, id: PostId) -> Result<(), RepoError>;
}

/// Attachment store. Rows are written through `PostRepository`.
pub trait AttachmentRepository: ReadRepository<Attachment, AttachmentId> {}

/// Member directory, keyed by user id.
pub trait MemberRepository: ReadRepository<Member, String> {}
