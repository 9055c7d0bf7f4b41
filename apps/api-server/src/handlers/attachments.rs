//! Attachment lookup and download.

use actix_web::{
    HttpResponse,
    http::header::{ContentDisposition, ContentType},
    web,
};

use board_core::domain::AttachmentId;
use board_shared::ApiResponse;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/attachments/{id}
pub async fn path(
    state: web::Data<AppState>,
    id: web::Path<AttachmentId>,
) -> AppResult<HttpResponse> {
    let path = state.posts.get_attachment_path(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(path)))
}

/// GET /api/attachments/{id}/download
pub async fn download(
    state: web::Data<AppState>,
    id: web::Path<AttachmentId>,
) -> AppResult<HttpResponse> {
    let (path, data) = state.posts.download_attachment(id.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::octet_stream())
        .insert_header(ContentDisposition::attachment(path.original_name))
        .body(data))
}
