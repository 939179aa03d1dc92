//! Storage abstraction trait
//!
//! This module defines the Storage trait that video file backends implement.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage name: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file written by [`Storage::upload_stream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Collision-free name under the storage directory.
    pub storage_name: String,
    pub size_bytes: u64,
}

/// Storage abstraction trait
///
/// Each file is written exactly once by `upload_stream` and removed exactly once by
/// `delete`. Storage names are single path segments; see the crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist `reader` until EOF under a freshly generated, unique storage name.
    ///
    /// If the stream fails midway the partial file is removed on a best-effort basis.
    async fn upload_stream(
        &self,
        original_filename: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<StoredFile>;

    /// Delete a file by its storage name. Deleting an absent file succeeds.
    async fn delete(&self, storage_name: &str) -> StorageResult<()>;

    /// Check if a file exists. Errors other than absence are returned, not folded into `false`.
    async fn exists(&self, storage_name: &str) -> StorageResult<bool>;

    /// Filesystem path of a stored file, for tools that need to read it directly.
    fn path_of(&self, storage_name: &str) -> StorageResult<PathBuf>;
}
