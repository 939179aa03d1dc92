use crate::keys::{generate_storage_name, is_valid_storage_name};
use crate::traits::{Storage, StorageError, StorageResult, StoredFile};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncRead;

/// Attempts at finding a free storage name before giving up.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating `base_path` if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a storage name to a filesystem path, rejecting anything that is not
    /// a single segment directly under the storage directory.
    fn name_to_path(&self, storage_name: &str) -> StorageResult<PathBuf> {
        if !is_valid_storage_name(storage_name) {
            return Err(StorageError::InvalidKey(format!(
                "Storage name contains invalid characters: {}",
                storage_name
            )));
        }
        Ok(self.base_path.join(storage_name))
    }

    async fn create_unique(&self, original_filename: &str) -> StorageResult<(String, PathBuf, fs::File)> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let storage_name = generate_storage_name(original_filename);
            let path = self.name_to_path(&storage_name)?;

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((storage_name, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(storage_name = %storage_name, "Storage name taken, regenerating");
                }
                Err(e) => {
                    return Err(StorageError::UploadFailed(format!(
                        "Failed to create file {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Err(StorageError::UploadFailed(format!(
            "No free storage name for {} after {} attempts",
            original_filename, MAX_NAME_ATTEMPTS
        )))
    }
}

async fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove partially written upload"
        );
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_stream(
        &self,
        original_filename: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<StoredFile> {
        let start = std::time::Instant::now();
        let (storage_name, path, mut file) = self.create_unique(original_filename).await?;

        let size_bytes = match tokio::io::copy(reader, &mut file).await {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                remove_partial(&path).await;
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write stream to file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if let Err(e) = file.sync_all().await {
            drop(file);
            remove_partial(&path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to sync file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            storage_name = %storage_name,
            size_bytes = size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(StoredFile {
            storage_name,
            size_bytes,
        })
    }

    async fn delete(&self, storage_name: &str) -> StorageResult<()> {
        let path = self.name_to_path(storage_name)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(storage_name = %storage_name, "File already absent on delete");
                return Ok(());
            }
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        tracing::info!(
            path = %path.display(),
            storage_name = %storage_name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_name: &str) -> StorageResult<bool> {
        let path = self.name_to_path(storage_name)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn path_of(&self, storage_name: &str) -> StorageResult<PathBuf> {
        self.name_to_path(storage_name)
    }
}
