//! Upload pipeline: persist → probe → construct → commit
//!
//! Each stage has one failure mode. Persisting and committing fail the upload with
//! `UploadIo`; probing never fails it and falls back to an unknown duration instead.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncRead;
use vidvault_core::{format_duration, AppError, VideoRecord, UNKNOWN_DURATION};
use vidvault_db::{RecordStore, StoreError};
use vidvault_processing::{probe_with_timeout, DurationProbe};
use vidvault_storage::Storage;

/// A video file that is on disk but not yet referenced by any record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedVideo {
    pub storage_name: String,
    pub size_bytes: u64,
}

#[derive(Clone)]
pub struct UploadService {
    store: Arc<RecordStore>,
    storage: Arc<dyn Storage>,
    probe: Arc<dyn DurationProbe>,
    probe_timeout: Duration,
}

impl UploadService {
    pub fn new(
        store: Arc<RecordStore>,
        storage: Arc<dyn Storage>,
        probe: Arc<dyn DurationProbe>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            store,
            storage,
            probe,
            probe_timeout,
        }
    }

    /// Persist, probe and commit in one go. The file is removed again if the commit fails.
    pub async fn upload(
        &self,
        original_filename: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        description: Option<String>,
    ) -> Result<VideoRecord, AppError> {
        let persisted = self.persist(original_filename, reader).await?;

        match self.complete(&persisted, description).await {
            Ok(record) => Ok(record),
            Err(e) => {
                self.discard(&persisted).await;
                Err(e)
            }
        }
    }

    /// Stream the upload to a freshly named file.
    #[tracing::instrument(skip(self, reader))]
    pub async fn persist(
        &self,
        original_filename: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<PersistedVideo, AppError> {
        let stored = self
            .storage
            .upload_stream(original_filename, reader)
            .await
            .map_err(|e| AppError::UploadIo(e.to_string()))?;

        Ok(PersistedVideo {
            storage_name: stored.storage_name,
            size_bytes: stored.size_bytes,
        })
    }

    /// Probe the persisted file, build its record and append it to the store.
    ///
    /// The record becomes visible to readers only once this returns `Ok`.
    #[tracing::instrument(skip(self, description), fields(storage_name = %persisted.storage_name))]
    pub async fn complete(
        &self,
        persisted: &PersistedVideo,
        description: Option<String>,
    ) -> Result<VideoRecord, AppError> {
        // A record must never point at a missing file.
        let present = self
            .storage
            .exists(&persisted.storage_name)
            .await
            .map_err(|e| AppError::UploadIo(e.to_string()))?;
        if !present {
            return Err(AppError::UploadIo(format!(
                "Persisted file {} is missing",
                persisted.storage_name
            )));
        }

        let duration = self.probe_duration(&persisted.storage_name).await;
        let record = VideoRecord::new(
            persisted.storage_name.clone(),
            description.unwrap_or_default(),
            duration,
        );

        let (record, _) = self
            .store
            .commit(move |records| {
                records.push(record.clone());
                Ok::<_, StoreError>(record)
            })
            .await
            .map_err(|e| AppError::UploadIo(format!("Failed to record upload: {}", e)))?;

        tracing::info!(
            video_id = %record.id,
            storage_name = %record.storage_name,
            size_bytes = persisted.size_bytes,
            duration = %record.duration,
            "Video uploaded"
        );

        Ok(record)
    }

    /// Best-effort removal of a persisted file that will never get a record.
    pub async fn discard(&self, persisted: &PersistedVideo) {
        if let Err(e) = self.storage.delete(&persisted.storage_name).await {
            tracing::warn!(
                error = %e,
                storage_name = %persisted.storage_name,
                "Failed to remove orphaned upload"
            );
        }
    }

    async fn probe_duration(&self, storage_name: &str) -> String {
        let path = match self.storage.path_of(storage_name) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, storage_name = %storage_name, "Cannot resolve video path for probing");
                return UNKNOWN_DURATION.to_string();
            }
        };

        match probe_with_timeout(self.probe.as_ref(), &path, self.probe_timeout).await {
            Ok(seconds) => format_duration(seconds),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    storage_name = %storage_name,
                    "Duration probe failed, recording unknown duration"
                );
                UNKNOWN_DURATION.to_string()
            }
        }
    }
}
