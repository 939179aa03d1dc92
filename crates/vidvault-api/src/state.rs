//! Shared application state handed to every handler.

use std::sync::Arc;

use vidvault_core::Config;
use vidvault_db::RecordStore;
use vidvault_processing::DurationProbe;
use vidvault_storage::Storage;

use crate::services::{UploadService, VideoService};

pub struct AppState {
    pub config: Config,
    pub store: Arc<RecordStore>,
    pub uploads: UploadService,
    pub videos: VideoService,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<RecordStore>,
        storage: Arc<dyn Storage>,
        probe: Arc<dyn DurationProbe>,
    ) -> Self {
        let uploads = UploadService::new(
            store.clone(),
            storage.clone(),
            probe,
            config.probe_timeout,
        );
        let videos = VideoService::new(store.clone(), storage);

        Self {
            config,
            store,
            uploads,
            videos,
        }
    }
}
