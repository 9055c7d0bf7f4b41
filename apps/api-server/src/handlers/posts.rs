//! Post handlers.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, http::header, web};

use board_core::domain::PostId;
use board_core::paging::PageRequest;
use board_core::service::{CreatePostRequest, UpdatePostRequest};
use board_shared::ApiResponse;
use board_shared::dto::{ListPostsQuery, PostCreatedResponse, SearchPostsQuery};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::multipart::read_post_form;
use crate::observability::RequestId;
use crate::state::AppState;

fn page_request(page: Option<u64>, size: Option<u64>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest::new(page.unwrap_or(defaults.page), size.unwrap_or(defaults.size))
}

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list_posts(page_request(query.page, query.size))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// GET /api/posts/search
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = state
        .posts
        .search_posts(query.keyword.trim(), page_request(query.page, query.size))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// GET /api/posts/{id}
pub async fn detail(state: web::Data<AppState>, id: web::Path<PostId>) -> AppResult<HttpResponse> {
    let post = state.posts.get_post(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    request_id: RequestId,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_post_form(payload, state.max_upload_bytes).await?;

    tracing::debug!(
        request_id = %request_id,
        user_id = %identity.user_id,
        files = form.files.len(),
        "Create post request"
    );

    let request = CreatePostRequest {
        title: form.title,
        body: form.body,
        author_id: identity.user_id,
    };
    let id = state.posts.create_post(request, form.files).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/posts/{}", id)))
        .json(ApiResponse::ok(PostCreatedResponse { id })))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    request_id: RequestId,
    id: web::Path<PostId>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_post_form(payload, state.max_upload_bytes).await?;
    let post_id = id.into_inner();

    tracing::debug!(
        request_id = %request_id,
        post_id,
        user_id = %identity.user_id,
        deleted = form.delete_ids.len(),
        files = form.files.len(),
        "Update post request"
    );

    let request = UpdatePostRequest {
        post_id,
        author_id: identity.user_id,
        title: form.title,
        body: form.body,
        delete_attachment_ids: form.delete_ids,
    };
    state.posts.update_post(request, form.files).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/posts/{id}
pub async fn remove(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .remove_post(id.into_inner(), &identity.principal())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
