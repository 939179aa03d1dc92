//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vidvault_core::Config;
use vidvault_db::RecordStore;
use vidvault_processing::{DurationProbe, FfprobeDurationProbe};
use vidvault_storage::{LocalStorage, Storage};

/// Build the state and router for `config`.
///
/// Fails fast on an invalid configuration, an unusable video directory or an
/// unreadable metadata file.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(&config.video_dir)
            .await
            .context("Failed to initialize video storage")?,
    );

    let store = Arc::new(RecordStore::new(config.metadata_file.clone()));
    let records = store
        .load()
        .await
        .context("Failed to load video metadata")?;

    let probe: Arc<dyn DurationProbe> = Arc::new(
        FfprobeDurationProbe::new(config.ffprobe_path.clone())
            .context("Failed to configure duration probe")?,
    );

    tracing::info!(
        video_dir = %config.video_dir.display(),
        metadata_file = %config.metadata_file.display(),
        videos = records.len(),
        "Video store ready"
    );

    let state = Arc::new(AppState::new(config, store, storage, probe));
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
