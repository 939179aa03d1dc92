//! Listing and mutation of existing videos.

use std::sync::Arc;

use uuid::Uuid;
use vidvault_core::{AppError, VideoRecord, VideoView};
use vidvault_db::RecordStore;
use vidvault_storage::Storage;

use crate::constants::MSG_VIDEO_NOT_FOUND;

fn not_found() -> AppError {
    AppError::NotFound(MSG_VIDEO_NOT_FOUND.to_string())
}

#[derive(Clone)]
pub struct VideoService {
    store: Arc<RecordStore>,
    storage: Arc<dyn Storage>,
}

impl VideoService {
    pub fn new(store: Arc<RecordStore>, storage: Arc<dyn Storage>) -> Self {
        Self { store, storage }
    }

    pub async fn list_records(&self) -> Result<Vec<VideoRecord>, AppError> {
        Ok(self.store.load().await?)
    }

    /// All videos in upload order, with playable URLs under `base_url`.
    pub async fn list(&self, base_url: &str) -> Result<Vec<VideoView>, AppError> {
        Ok(self
            .list_records()
            .await?
            .iter()
            .map(|record| VideoView::from_record(record, base_url))
            .collect())
    }

    /// Replace the description of `id`.
    ///
    /// A missing or empty description leaves the record untouched and writes nothing.
    #[tracing::instrument(skip(self, description), fields(video_id = %id))]
    pub async fn update_description(
        &self,
        id: Uuid,
        description: Option<String>,
    ) -> Result<VideoRecord, AppError> {
        let Some(description) = description.filter(|d| !d.is_empty()) else {
            return self.store.find(id).await?.ok_or_else(not_found);
        };

        let (record, _) = self
            .store
            .commit(|records| {
                let record = records
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(not_found)?;
                record.description = description;
                Ok::<_, AppError>(record.clone())
            })
            .await?;

        tracing::info!(video_id = %id, "Video description updated");
        Ok(record)
    }

    /// Remove the backing file, then the record.
    ///
    /// The store stays locked throughout, so no other mutation can observe the record
    /// without its file. If the file cannot be removed the record is kept.
    #[tracing::instrument(skip(self), fields(video_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<VideoRecord, AppError> {
        let mut tx = self.store.begin().await?;

        let position = tx
            .records()
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(not_found)?;
        let storage_name = tx.records()[position].storage_name.clone();

        self.storage
            .delete(&storage_name)
            .await
            .map_err(|e| AppError::DeleteIo(e.to_string()))?;

        let removed = tx.records_mut().remove(position);
        tx.commit().await?;

        tracing::info!(video_id = %id, storage_name = %storage_name, "Video deleted");
        Ok(removed)
    }
}
