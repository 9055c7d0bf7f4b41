//! File transfer port - physical storage of uploaded attachment files.

use async_trait::async_trait;

use crate::domain::PathDescriptor;
use crate::error::FileTransferError;

/// A file as received from the client, before a storage path is assigned.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub original_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl RawUpload {
    pub fn new(original_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            original_name: original_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Browsers submit an empty part for a file input left blank.
    pub fn is_blank(&self) -> bool {
        self.original_name.is_empty() && self.data.is_empty()
    }
}

/// An upload with its assigned storage path, ready to be written.
#[derive(Debug, Clone)]
pub struct UploadDescriptor {
    pub path: PathDescriptor,
    pub data: Vec<u8>,
}

/// File transfer service - assigns storage paths and moves bytes in and out
/// of the backing store.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    /// Assign a storage path under `group` to every non-blank upload, in order.
    fn prepare_uploads(&self, group: &str, files: Vec<RawUpload>) -> Vec<UploadDescriptor>;

    /// Physically write prepared uploads.
    async fn write_files(&self, uploads: &[UploadDescriptor]) -> Result<(), FileTransferError>;

    async fn read_file(&self, path: &PathDescriptor) -> Result<Vec<u8>, FileTransferError>;

    /// Remove a previously written file. Missing files are not an error.
    async fn delete_file(&self, path: &PathDescriptor) -> Result<(), FileTransferError>;
}
