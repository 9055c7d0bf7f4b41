//! Reads the multipart forms used to create and edit posts.

use std::path::Path;

use actix_multipart::Multipart;
use futures::StreamExt;

use board_core::domain::AttachmentId;
use board_core::ports::RawUpload;
use board_shared::dto::fields;

use crate::middleware::error::AppError;

/// Fields of a post create/edit form.
#[derive(Debug, Default)]
pub struct PostForm {
    pub title: String,
    pub body: String,
    pub delete_ids: Vec<AttachmentId>,
    pub files: Vec<RawUpload>,
}

/// Drain the multipart stream into a `PostForm`, rejecting requests whose
/// parts add up to more than `limit` bytes. Unknown fields are ignored.
pub async fn read_post_form(mut payload: Multipart, limit: usize) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();
    let mut total = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(e.to_string()))?;

        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(client_file_name);
        let content_type = field.content_type().map(|m| m.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
            total += chunk.len();
            if total > limit {
                return Err(AppError::PayloadTooLarge(limit));
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            fields::TITLE => form.title = text(data, fields::TITLE)?,
            fields::BODY => form.body = text(data, fields::BODY)?,
            fields::DELETE_FILES => {
                let raw = text(data, fields::DELETE_FILES)?;
                form.delete_ids.extend(parse_ids(&raw)?);
            }
            fields::FILES => form.files.push(RawUpload {
                original_name: filename.unwrap_or_default(),
                content_type,
                data,
            }),
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn text(data: Vec<u8>, field: &str) -> Result<String, AppError> {
    String::from_utf8(data).map_err(|_| AppError::BadRequest(format!("{} must be UTF-8", field)))
}

/// Accepts a single id or a comma separated list.
fn parse_ids(raw: &str) -> Result<Vec<AttachmentId>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| AppError::BadRequest(format!("Invalid attachment id: {}", s)))
        })
        .collect()
}

/// Some clients send the full local path; keep only the last component.
fn client_file_name(name: &str) -> String {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("1").unwrap(), vec![1]);
        assert_eq!(parse_ids("1, 2,,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_ids("").unwrap().is_empty());
        assert!(parse_ids("x").is_err());
    }

    #[test]
    fn test_client_file_name() {
        assert_eq!(client_file_name("photo.png"), "photo.png");
        assert_eq!(client_file_name("C:\\Users\\me\\photo.png"), "photo.png");
        assert_eq!(client_file_name("../../etc/passwd"), "passwd");
        assert_eq!(client_file_name(".."), "");
    }
}
