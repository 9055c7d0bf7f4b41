//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::{LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set, TransactionTrait, Unchanged,
};

use board_core::domain::{NewPost, Post, PostEdit, PostId};
use board_core::error::RepoError;
use board_core::paging::{Page, PageRequest};
use board_core::ports::{AttachmentRepository, MemberRepository, PostRepository};

use super::entity::attachment::{self, Entity as AttachmentEntity};
use super::entity::member::Entity as MemberEntity;
use super::entity::post::{self, Entity as PostEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL attachment repository.
pub type PostgresAttachmentRepository = PostgresBaseRepository<AttachmentEntity>;

/// PostgreSQL member directory.
pub type PostgresMemberRepository = PostgresBaseRepository<MemberEntity>;

impl AttachmentRepository for PostgresAttachmentRepository {}

impl MemberRepository for PostgresMemberRepository {}

/// PostgreSQL post repository. Each mutation runs in its own transaction.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn fetch_page(
        &self,
        query: Select<PostEntity>,
        page: &PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let paginator = query
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await.map_err(query_error)?;
        let rows = paginator
            .fetch_page(page.index())
            .await
            .map_err(query_error)?;

        let posts = with_attachments(&self.db, rows)
            .await
            .map_err(query_error)?;

        Ok(Page::new(posts, *page, total))
    }
}

const LIKE_ESCAPE: char = '\\';

/// `title LIKE '%keyword%'` with the keyword matched literally.
pub(crate) fn title_contains(keyword: &str) -> SimpleExpr {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');

    post::Column::Title.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

/// Attachment rows of the given posts, ordered by id.
async fn attachments_of<C: ConnectionTrait>(
    conn: &C,
    post_ids: &[PostId],
) -> Result<Vec<attachment::Model>, DbErr> {
    if post_ids.is_empty() {
        return Ok(Vec::new());
    }

    AttachmentEntity::find()
        .filter(attachment::Column::PostId.is_in(post_ids.iter().copied()))
        .order_by_asc(attachment::Column::Id)
        .all(conn)
        .await
}

/// Attach each post's attachment rows, keeping the order of `rows`.
async fn with_attachments<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<post::Model>,
) -> Result<Vec<Post>, DbErr> {
    let ids: Vec<PostId> = rows.iter().map(|p| p.id).collect();

    let mut by_post: HashMap<PostId, Vec<attachment::Model>> = HashMap::new();
    for row in attachments_of(conn, &ids).await? {
        by_post.entry(row.post_id).or_default().push(row);
    }

    Ok(rows
        .into_iter()
        .map(|p| {
            let attachments = by_post.remove(&p.id).unwrap_or_default();
            p.into_domain(attachments)
        })
        .collect())
}

async fn load_post<C: ConnectionTrait>(conn: &C, id: PostId) -> Result<Option<Post>, DbErr> {
    let Some(row) = PostEntity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };

    let attachments = attachments_of(conn, &[id]).await?;
    Ok(Some(row.into_domain(attachments)))
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        load_post(&self.db, id).await.map_err(query_error)
    }

    async fn find_page(&self, page: &PageRequest) -> Result<Page<Post>, RepoError> {
        self.fetch_page(PostEntity::find(), page).await
    }

    async fn search_by_title(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let query = PostEntity::find().filter(title_contains(keyword));
        self.fetch_page(query, page).await
    }

    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;

        let row = post::ActiveModel::from(&new_post)
            .insert(&txn)
            .await
            .map_err(query_error)?;

        let mut attachments = Vec::with_capacity(new_post.attachments.len());
        for path in new_post.attachments {
            let saved = attachment::ActiveModel::for_post(row.id, path)
                .insert(&txn)
                .await
                .map_err(query_error)?;
            attachments.push(saved);
        }

        txn.commit().await.map_err(query_error)?;

        tracing::debug!(post_id = row.id, "Inserted post");
        Ok(row.into_domain(attachments))
    }

    async fn apply(&self, edit: PostEdit) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;

        post::ActiveModel {
            id: Unchanged(edit.post_id),
            title: Set(edit.title.clone()),
            body: Set(edit.body.clone()),
            updated_at: Set(edit.updated_at.into()),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(query_error)?;

        let removed = edit.removed_ids();
        if !removed.is_empty() {
            AttachmentEntity::delete_many()
                .filter(attachment::Column::PostId.eq(edit.post_id))
                .filter(attachment::Column::Id.is_in(removed))
                .exec(&txn)
                .await
                .map_err(query_error)?;
        }

        for path in edit.added {
            attachment::ActiveModel::for_post(edit.post_id, path)
                .insert(&txn)
                .await
                .map_err(query_error)?;
        }

        let post = load_post(&txn, edit.post_id)
            .await
            .map_err(query_error)?
            .ok_or(RepoError::NotFound)?;

        txn.commit().await.map_err(query_error)?;

        tracing::debug!(post_id = post.id, "Applied post edit");
        Ok(post)
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;

        AttachmentEntity::delete_many()
            .filter(attachment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(query_error)?;

        let result = PostEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(query_error)?;

        tracing::debug!(post_id = id, "Deleted post");
        Ok(())
    }
}
