//! Local filesystem file transfer.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use board_core::domain::PathDescriptor;
use board_core::error::FileTransferError;
use board_core::ports::{FileTransfer, RawUpload, UploadDescriptor};

/// Stores uploads under a base directory as `<group>/<yyyy>/<mm>/<dd>/<uuid>`.
pub struct LocalFileTransfer {
    base_path: PathBuf,
}

impl LocalFileTransfer {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Resolve a stored path against the base directory, refusing anything
    /// that would escape it.
    fn physical_path(&self, stored_path: &str) -> Result<PathBuf, FileTransferError> {
        let relative = Path::new(stored_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || stored_path.is_empty() {
            return Err(FileTransferError::Backend(format!(
                "invalid stored path: {}",
                stored_path
            )));
        }
        Ok(self.base_path.join(relative))
    }

    fn assign_path(group: &str) -> String {
        let today = Utc::now().format("%Y/%m/%d");
        format!("{}/{}/{}", group, today, Uuid::new_v4())
    }
}

#[async_trait]
impl FileTransfer for LocalFileTransfer {
    fn prepare_uploads(&self, group: &str, files: Vec<RawUpload>) -> Vec<UploadDescriptor> {
        files
            .into_iter()
            .filter(|f| !f.is_blank())
            .map(|f| UploadDescriptor {
                path: PathDescriptor {
                    group_name: group.to_string(),
                    stored_path: Self::assign_path(group),
                    original_name: f.original_name,
                },
                data: f.data,
            })
            .collect()
    }

    async fn write_files(&self, uploads: &[UploadDescriptor]) -> Result<(), FileTransferError> {
        for upload in uploads {
            let path = self.physical_path(&upload.path.stored_path)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &upload.data).await?;
            tracing::debug!(stored_path = %upload.path.stored_path, bytes = upload.data.len(), "Wrote file");
        }
        Ok(())
    }

    async fn read_file(&self, path: &PathDescriptor) -> Result<Vec<u8>, FileTransferError> {
        let physical = self.physical_path(&path.stored_path)?;
        if !tokio::fs::try_exists(&physical).await? {
            return Err(FileTransferError::NotFound(path.stored_path.clone()));
        }
        Ok(tokio::fs::read(&physical).await?)
    }

    async fn delete_file(&self, path: &PathDescriptor) -> Result<(), FileTransferError> {
        let physical = self.physical_path(&path.stored_path)?;
        if tokio::fs::try_exists(&physical).await? {
            tokio::fs::remove_file(&physical).await?;
            tracing::debug!(stored_path = %path.stored_path, "Deleted file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(stored_path: &str) -> PathDescriptor {
        PathDescriptor {
            group_name: "board".to_string(),
            stored_path: stored_path.to_string(),
            original_name: "notes.txt".to_string(),
        }
    }

    #[test]
    fn test_prepare_skips_blank_parts() {
        let dir = tempfile::tempdir().unwrap();
        let transfer = LocalFileTransfer::new(dir.path()).unwrap();

        let uploads = transfer.prepare_uploads(
            "board",
            vec![
                RawUpload::new("a.txt", b"alpha".to_vec()),
                RawUpload::new("", Vec::new()),
                RawUpload::new("b.txt", b"beta".to_vec()),
            ],
        );

        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].path.original_name, "a.txt");
        assert_eq!(uploads[1].path.original_name, "b.txt");
        assert!(uploads[0].path.stored_path.starts_with("board/"));
        assert_ne!(uploads[0].path.stored_path, uploads[1].path.stored_path);
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let transfer = LocalFileTransfer::new(dir.path()).unwrap();

        assert!(transfer.physical_path("../etc/passwd").is_err());
        assert!(transfer.physical_path("/etc/passwd").is_err());
        assert!(transfer.physical_path("").is_err());
        assert!(transfer.physical_path("board/2024/01/01/x").is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let transfer = LocalFileTransfer::new(dir.path()).unwrap();

        transfer
            .delete_file(&descriptor("board/2024/01/01/missing"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let transfer = LocalFileTransfer::new(dir.path()).unwrap();

        let result = transfer
            .read_file(&descriptor("board/2024/01/01/missing"))
            .await;
        assert!(matches!(result, Err(FileTransferError::NotFound(_))));
    }
}
