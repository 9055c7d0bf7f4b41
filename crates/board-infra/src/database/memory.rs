//! In-memory board store - used when no database is configured, and in tests.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use board_core::domain::{Attachment, AttachmentId, Member, NewPost, Post, PostEdit, PostId};
use board_core::error::RepoError;
use board_core::paging::{Page, PageRequest};
use board_core::ports::{AttachmentRepository, MemberRepository, PostRepository, ReadRepository};

struct PostRow {
    title: String,
    body: String,
    author_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    next_post_id: PostId,
    next_attachment_id: AttachmentId,
    posts: BTreeMap<PostId, PostRow>,
    attachments: BTreeMap<AttachmentId, Attachment>,
    members: HashMap<String, Member>,
}

impl State {
    fn assemble(&self, id: PostId, row: &PostRow) -> Post {
        Post {
            id,
            title: row.title.clone(),
            body: row.body.clone(),
            author_id: row.author_id.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            attachments: self
                .attachments
                .values()
                .filter(|a| a.post_id == id)
                .cloned()
                .collect(),
        }
    }

    fn add_attachment(
        &mut self,
        post_id: PostId,
        path: board_core::domain::PathDescriptor,
    ) -> Result<(), RepoError> {
        if self
            .attachments
            .values()
            .any(|a| a.path.stored_path == path.stored_path)
        {
            return Err(RepoError::Constraint(format!(
                "stored path {} already exists",
                path.stored_path
            )));
        }

        self.next_attachment_id += 1;
        let id = self.next_attachment_id;
        self.attachments.insert(
            id,
            Attachment {
                id,
                post_id,
                path,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Newest first, optionally filtered by title.
    fn page(&self, keyword: Option<&str>, request: &PageRequest) -> Page<Post> {
        let matching: Vec<(&PostId, &PostRow)> = self
            .posts
            .iter()
            .rev()
            .filter(|(_, row)| keyword.is_none_or(|k| row.title.contains(k)))
            .collect();

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(request.limit() as usize)
            .map(|(id, row)| self.assemble(*id, row))
            .collect();

        Page::new(items, *request, total)
    }
}

/// In-memory implementation of the post store, attachment store and member
/// directory, sharing one lock so every mutation is atomic.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryBoardStore {
    state: RwLock<State>,
}

impl InMemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member in the directory.
    pub async fn add_member(&self, member: Member) {
        let mut state = self.state.write().await;
        state.members.insert(member.user_id.clone(), member);
    }

    pub async fn attachment_count(&self) -> usize {
        self.state.read().await.attachments.len()
    }
}

#[async_trait]
impl PostRepository for InMemoryBoardStore {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).map(|row| state.assemble(id, row)))
    }

    async fn find_page(&self, page: &PageRequest) -> Result<Page<Post>, RepoError> {
        Ok(self.state.read().await.page(None, page))
    }

    async fn search_by_title(
        &self,
        keyword: &str,
        page: &PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        Ok(self.state.read().await.page(Some(keyword), page))
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;

        if !state.members.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "unknown author {}",
                post.author_id
            )));
        }

        let now = Utc::now();
        state.next_post_id += 1;
        let id = state.next_post_id;
        state.posts.insert(
            id,
            PostRow {
                title: post.title,
                body: post.body,
                author_id: post.author_id,
                created_at: now,
                updated_at: now,
            },
        );

        for path in post.attachments {
            if let Err(e) = state.add_attachment(id, path) {
                // roll back the partial insert
                state.attachments.retain(|_, a| a.post_id != id);
                state.posts.remove(&id);
                return Err(e);
            }
        }

        let row = &state.posts[&id];
        Ok(state.assemble(id, row))
    }

    async fn apply(&self, edit: PostEdit) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;

        if !state.posts.contains_key(&edit.post_id) {
            return Err(RepoError::NotFound);
        }

        // Validate before mutating anything.
        let removed = edit.removed_ids();
        let mut seen = HashSet::new();
        for path in &edit.added {
            let clash = !seen.insert(path.stored_path.as_str())
                || state.attachments.values().any(|a| {
                    a.path.stored_path == path.stored_path && !removed.contains(&a.id)
                });
            if clash {
                return Err(RepoError::Constraint(format!(
                    "stored path {} already exists",
                    path.stored_path
                )));
            }
        }

        if let Some(row) = state.posts.get_mut(&edit.post_id) {
            row.title = edit.title;
            row.body = edit.body;
            row.updated_at = edit.updated_at;
        }

        let post_id = edit.post_id;
        state
            .attachments
            .retain(|id, a| !(a.post_id == post_id && removed.contains(id)));

        for path in edit.added {
            state.add_attachment(post_id, path)?;
        }

        let row = &state.posts[&post_id];
        Ok(state.assemble(post_id, row))
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let mut state = self.state.write().await;

        if state.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        state.attachments.retain(|_, a| a.post_id != id);

        Ok(())
    }
}

#[async_trait]
impl ReadRepository<Attachment, AttachmentId> for InMemoryBoardStore {
    async fn find_by_id(&self, id: AttachmentId) -> Result<Option<Attachment>, RepoError> {
        Ok(self.state.read().await.attachments.get(&id).cloned())
    }
}

impl AttachmentRepository for InMemoryBoardStore {}

#[async_trait]
impl ReadRepository<Member, String> for InMemoryBoardStore {
    async fn find_by_id(&self, user_id: String) -> Result<Option<Member>, RepoError> {
        Ok(self.state.read().await.members.get(&user_id).cloned())
    }
}

impl MemberRepository for InMemoryBoardStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::domain::PathDescriptor;

    fn path(name: &str) -> PathDescriptor {
        PathDescriptor {
            group_name: "board".to_string(),
            stored_path: format!("board/2024/01/01/{}", name),
            original_name: format!("{}.txt", name),
        }
    }

    async fn store_with_member() -> InMemoryBoardStore {
        let store = InMemoryBoardStore::new();
        store.add_member(Member::new("u1", "first")).await;
        store
    }

    fn new_post(title: &str, paths: Vec<PathDescriptor>) -> NewPost {
        let mut post = NewPost::new(title.to_string(), "body".to_string(), "u1".to_string());
        for p in paths {
            post.attach(p);
        }
        post
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = store_with_member().await;
        let post = store
            .insert(new_post("hello", vec![path("a"), path("b")]))
            .await
            .unwrap();

        assert_eq!(post.id, 1);
        let ids: Vec<_> = post.attachments.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_author() {
        let store = InMemoryBoardStore::new();
        let result = store.insert(new_post("hello", vec![])).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_insert_with_duplicate_path_rolls_back() {
        let store = store_with_member().await;
        let result = store
            .insert(new_post("hello", vec![path("a"), path("a")]))
            .await;

        assert!(result.is_err());
        assert_eq!(store.attachment_count().await, 0);
        let page = store.find_page(&PageRequest::default()).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_page_is_newest_first() {
        let store = store_with_member().await;
        for title in ["one", "two", "three"] {
            store.insert(new_post(title, vec![])).await.unwrap();
        }

        let page = store.find_page(&PageRequest::new(1, 2)).await.unwrap();
        let titles: Vec<_> = page.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["three", "two"]);
        assert_eq!(page.paging.total_items, 3);
        assert_eq!(page.paging.total_pages, 2);
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let store = store_with_member().await;
        store.insert(new_post("only", vec![])).await.unwrap();

        let page = store
            .find_page(&PageRequest::new(u64::MAX, 10))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.paging.total_items, 1);

        let raw = PageRequest {
            page: u64::MAX,
            size: u64::MAX,
        };
        assert!(store.find_page(&raw).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_keyword_literally() {
        let store = store_with_member().await;
        for title in ["a_b", "axb", "100%", "1000", "back\\slash"] {
            store.insert(new_post(title, vec![])).await.unwrap();
        }

        let titles = |page: Page<Post>| -> Vec<String> {
            page.items.into_iter().map(|p| p.title).collect()
        };
        let request = PageRequest::default();

        assert_eq!(
            titles(store.search_by_title("a_b", &request).await.unwrap()),
            vec!["a_b"]
        );
        assert_eq!(
            titles(store.search_by_title("0%", &request).await.unwrap()),
            vec!["100%"]
        );
        assert_eq!(
            titles(store.search_by_title("\\", &request).await.unwrap()),
            vec!["back\\slash"]
        );
    }

    #[tokio::test]
    async fn test_apply_with_duplicate_new_paths_changes_nothing() {
        let store = store_with_member().await;
        let post = store
            .insert(new_post("hello", vec![path("a")]))
            .await
            .unwrap();

        let mut edit = post.edit("changed".to_string(), "changed".to_string());
        edit.detach(post.attachments[0].clone());
        edit.attach(path("b"));
        edit.attach(path("b"));

        let result = store.apply(edit).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));

        let after = PostRepository::find_by_id(&store, post.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.title, "hello");
        assert_eq!(after.updated_at, post.updated_at);
        let ids: Vec<_> = after.attachments.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![post.attachments[0].id]);
        assert_eq!(store.attachment_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_attachments() {
        let store = store_with_member().await;
        let post = store
            .insert(new_post("hello", vec![path("a")]))
            .await
            .unwrap();

        store.delete(post.id).await.unwrap();

        assert_eq!(store.attachment_count().await, 0);
        assert!(matches!(
            store.delete(post.id).await,
            Err(RepoError::NotFound)
        ));
    }
}
