//! Post use cases: keeps post records and their attachment files consistent.

use std::sync::Arc;

use crate::domain::{
    AttachmentId, NewPost, PathDescriptor, Post, PostId, Principal, validate_content,
};
use crate::error::DomainError;
use crate::paging::{Page, PageRequest};
use crate::ports::{
    AttachmentRepository, FileTransfer, MemberRepository, PostRepository, RawUpload,
};

use super::views::{PostDetail, PostSummary};

/// Storage group for board attachments.
pub const UPLOAD_GROUP: &str = "board";

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    pub author_id: String,
}

/// Input for editing a post.
#[derive(Debug, Clone)]
pub struct UpdatePostRequest {
    pub post_id: PostId,
    pub author_id: String,
    pub title: String,
    pub body: String,
    pub delete_attachment_ids: Vec<AttachmentId>,
}

/// Orchestrates the post store, attachment store, member directory and file
/// transfer service.
///
/// Store mutations are committed before any file is touched. New files are
/// written after the commit; files of removed attachments are deleted last,
/// on a best-effort basis.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    attachments: Arc<dyn AttachmentRepository>,
    members: Arc<dyn MemberRepository>,
    files: Arc<dyn FileTransfer>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        attachments: Arc<dyn AttachmentRepository>,
        members: Arc<dyn MemberRepository>,
        files: Arc<dyn FileTransfer>,
    ) -> Self {
        Self {
            posts,
            attachments,
            members,
            files,
        }
    }

    pub async fn create_post(
        &self,
        request: CreatePostRequest,
        files: Vec<RawUpload>,
    ) -> Result<PostId, DomainError> {
        validate_content(&request.title, &request.body)?;

        let member = self
            .members
            .find_by_id(request.author_id.clone())
            .await?
            .ok_or_else(|| DomainError::not_found("Member", &request.author_id))?;

        let mut post = NewPost::new(request.title, request.body, member.user_id);
        let uploads = self.files.prepare_uploads(UPLOAD_GROUP, files);
        for upload in &uploads {
            post.attach(upload.path.clone());
        }

        let saved = self.posts.insert(post).await?;

        self.files.write_files(&uploads).await.map_err(|e| {
            tracing::error!(post_id = saved.id, error = %e, "Failed to write attachment files");
            e
        })?;

        tracing::info!(
            post_id = saved.id,
            author_id = %saved.author_id,
            attachments = uploads.len(),
            "Post created"
        );

        Ok(saved.id)
    }

    pub async fn list_posts(&self, page: PageRequest) -> Result<Page<PostSummary>, DomainError> {
        tracing::debug!(page = page.page, size = page.size, "Listing posts");
        let result = self.posts.find_page(&page).await?;
        Ok(result.map(PostSummary::from))
    }

    pub async fn search_posts(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, DomainError> {
        tracing::debug!(keyword = %keyword, page = page.page, "Searching posts");
        let result = self.posts.search_by_title(keyword, &page).await?;
        Ok(result.map(PostSummary::from))
    }

    pub async fn get_post(&self, id: PostId) -> Result<PostDetail, DomainError> {
        let post = self.load_post(id).await?;
        Ok(post.into())
    }

    pub async fn get_attachment_path(
        &self,
        id: AttachmentId,
    ) -> Result<PathDescriptor, DomainError> {
        let attachment = self
            .attachments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Attachment", id))?;

        Ok(attachment.path)
    }

    /// Look up an attachment and read its file.
    pub async fn download_attachment(
        &self,
        id: AttachmentId,
    ) -> Result<(PathDescriptor, Vec<u8>), DomainError> {
        let path = self.get_attachment_path(id).await?;
        let data = self.files.read_file(&path).await?;
        Ok((path, data))
    }

    pub async fn update_post(
        &self,
        request: UpdatePostRequest,
        files: Vec<RawUpload>,
    ) -> Result<(), DomainError> {
        let post = self.load_post(request.post_id).await?;

        if !post.is_authored_by(&request.author_id) {
            tracing::warn!(
                post_id = post.id,
                user_id = %request.author_id,
                "Rejected edit by non-author"
            );
            return Err(DomainError::Unauthorized);
        }

        validate_content(&request.title, &request.body)?;

        let mut edit = post.edit(request.title, request.body);

        // only this post's own attachments can be removed
        for id in request.delete_attachment_ids {
            let attachment = post
                .attachment(id)
                .cloned()
                .ok_or_else(|| DomainError::not_found("Attachment", id))?;
            edit.detach(attachment);
        }

        let uploads = self.files.prepare_uploads(UPLOAD_GROUP, files);
        for upload in &uploads {
            edit.attach(upload.path.clone());
        }

        let stale: Vec<PathDescriptor> = edit.removed.iter().map(|a| a.path.clone()).collect();

        self.posts.apply(edit).await?;

        self.files.write_files(&uploads).await.map_err(|e| {
            tracing::error!(post_id = post.id, error = %e, "Failed to write attachment files");
            e
        })?;

        self.delete_files(&stale).await;

        tracing::info!(
            post_id = post.id,
            added = uploads.len(),
            removed = stale.len(),
            "Post updated"
        );

        Ok(())
    }

    pub async fn remove_post(&self, id: PostId, principal: &Principal) -> Result<(), DomainError> {
        let post = self.load_post(id).await?;

        if !principal.owns(&post) {
            tracing::warn!(
                post_id = post.id,
                user_id = %principal.user_id,
                "Rejected removal by non-author"
            );
            return Err(DomainError::Unauthorized);
        }

        let paths: Vec<PathDescriptor> =
            post.attachments.iter().map(|a| a.path.clone()).collect();

        self.posts.delete(post.id).await?;
        self.delete_files(&paths).await;

        tracing::info!(post_id = post.id, files = paths.len(), "Post removed");

        Ok(())
    }

    async fn load_post(&self, id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    /// Failures are logged and otherwise ignored: the records are already gone.
    async fn delete_files(&self, paths: &[PathDescriptor]) {
        for path in paths {
            if let Err(e) = self.files.delete_file(path).await {
                tracing::warn!(
                    stored_path = %path.stored_path,
                    error = %e,
                    "Failed to delete attachment file"
                );
            }
        }
    }
}
