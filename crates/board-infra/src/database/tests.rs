use std::collections::BTreeMap;

use sea_orm::{
    DatabaseBackend, EntityTrait, MockDatabase, MockExecResult, QueryFilter, QueryTrait, Value,
};

use crate::database::entity::{attachment, member, post};
use crate::database::postgres_repo::{
    PostgresMemberRepository, PostgresPostRepository, title_contains,
};
use board_core::domain::Member;
use board_core::error::RepoError;
use board_core::paging::PageRequest;
use board_core::ports::{PostRepository, ReadRepository};

fn post_model(id: i64, title: &str) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        title: title.to_owned(),
        body: "Body".to_owned(),
        author_id: "u1".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn attachment_model(id: i64, post_id: i64) -> attachment::Model {
    attachment::Model {
        id,
        post_id,
        group_name: "board".to_owned(),
        stored_path: format!("board/2024/01/01/{}", id),
        original_name: format!("file-{}.png", id),
        created_at: chrono::Utc::now().into(),
    }
}

#[tokio::test]
async fn test_find_post_with_attachments() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(7, "Test Post")]])
        .append_query_results([vec![attachment_model(1, 7), attachment_model(2, 7)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post = repo.find_by_id(7).await.unwrap().unwrap();

    assert_eq!(post.title, "Test Post");
    assert_eq!(post.author_id, "u1");
    let ids: Vec<_> = post.attachments.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(post.attachments[0].path.original_name, "file-1.png");
}

#[tokio::test]
async fn test_find_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(repo.find_by_id(99).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_page_groups_attachments() {
    let count = BTreeMap::from([("num_items", Value::BigInt(Some(12)))]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count]])
        .append_query_results([vec![post_model(12, "newest"), post_model(11, "older")]])
        .append_query_results([vec![attachment_model(5, 11)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let page = repo.find_page(&PageRequest::new(1, 2)).await.unwrap();

    assert_eq!(page.paging.total_items, 12);
    assert_eq!(page.paging.total_pages, 6);
    assert_eq!(page.items[0].id, 12);
    assert!(page.items[0].attachments.is_empty());
    assert_eq!(page.items[1].attachments.len(), 1);
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(matches!(repo.delete(3).await, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_member_by_user_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![member::Model {
            user_id: "u1".to_owned(),
            nickname: "first".to_owned(),
            created_at: chrono::Utc::now().into(),
        }]])
        .into_connection();

    let repo = PostgresMemberRepository::new(db);

    let member: Option<Member> = repo.find_by_id("u1".to_string()).await.unwrap();

    assert_eq!(member.map(|m| m.nickname), Some("first".to_string()));
}

#[test]
fn test_title_search_escapes_like_wildcards() {
    let stmt = post::Entity::find()
        .filter(title_contains(r"a_b%c\d"))
        .build(DatabaseBackend::Postgres);

    assert!(stmt.sql.contains(r#""posts"."title" LIKE $1 ESCAPE"#));
    let values = stmt.values.unwrap().0;
    assert_eq!(values, vec![Value::from(r"%a\_b\%c\\d%")]);
}

#[test]
fn test_title_search_plain_keyword() {
    let stmt = post::Entity::find()
        .filter(title_contains("hello"))
        .build(DatabaseBackend::Postgres);

    assert_eq!(stmt.values.unwrap().0, vec![Value::from("%hello%")]);
}

#[tokio::test]
async fn test_search_by_title_pages_matches() {
    let count = BTreeMap::from([("num_items", Value::BigInt(Some(1)))]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count]])
        .append_query_results([vec![post_model(4, "a_b")]])
        .append_query_results([Vec::<attachment::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let page = repo
        .search_by_title("a_b", &PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.paging.total_items, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "a_b");
}

#[tokio::test]
async fn test_page_far_past_the_end_does_not_overflow() {
    let count = BTreeMap::from([("num_items", Value::BigInt(Some(3)))]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count]])
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let page = repo
        .find_page(&PageRequest {
            page: u64::MAX,
            size: u64::MAX,
        })
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.paging.total_items, 3);
}
