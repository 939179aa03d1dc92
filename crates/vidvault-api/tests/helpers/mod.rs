//! Test helpers: build AppState and router for integration tests.
//!
//! Every app gets its own temporary video directory and a scripted duration probe,
//! so no ffprobe binary is needed.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use vidvault_api::setup::routes;
use vidvault_api::AppState;
use vidvault_core::Config;
use vidvault_db::RecordStore;
use vidvault_processing::{DurationProbe, ProbeError};
use vidvault_storage::{LocalStorage, Storage};

/// Probe returning a fixed duration, or failing when none is set.
pub struct FakeProbe {
    seconds: Option<f64>,
}

impl FakeProbe {
    pub fn seconds(seconds: f64) -> Arc<Self> {
        Arc::new(Self {
            seconds: Some(seconds),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { seconds: None })
    }
}

#[async_trait]
impl DurationProbe for FakeProbe {
    async fn probe_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        assert!(path.exists(), "probe ran before the file was persisted");
        self.seconds.ok_or_else(|| ProbeError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "Invalid data found when processing input".to_string(),
        })
    }
}

/// Probe that never answers.
pub struct HangingProbe;

#[async_trait]
impl DurationProbe for HangingProbe {
    async fn probe_seconds(&self, _path: &Path) -> Result<f64, ProbeError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(1.0)
    }
}

/// Test application: server, shared state and the owned temp directory.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn video_dir(&self) -> PathBuf {
        self.state.config.video_dir.clone()
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.state.config.metadata_file.clone()
    }

    /// Names of the video files currently on disk, excluding the metadata file.
    pub fn video_files(&self) -> Vec<String> {
        video_files_in(&self.video_dir())
    }
}

pub fn video_files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read video directory")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| !n.starts_with("metadata.json"))
        .collect();
    names.sort();
    names
}

/// Setup test app whose probe reports 75 seconds for every file.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_probe(FakeProbe::seconds(75.0)).await
}

pub async fn setup_test_app_with_probe(probe: Arc<dyn DurationProbe>) -> TestApp {
    setup_test_app_with(probe, |_| {}).await
}

/// Setup test app with adjusted configuration, e.g. a smaller upload limit.
pub async fn setup_test_app_with_config(configure: impl FnOnce(&mut Config)) -> TestApp {
    setup_test_app_with(FakeProbe::seconds(75.0), configure).await
}

async fn setup_test_app_with(
    probe: Arc<dyn DurationProbe>,
    configure: impl FnOnce(&mut Config),
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let mut config = Config::for_video_dir(temp_dir.path().join("videos"));
    configure(&mut config);

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(&config.video_dir)
            .await
            .expect("Failed to create local storage"),
    );
    let store = Arc::new(RecordStore::new(config.metadata_file.clone()));
    let state = Arc::new(AppState::new(config, store, storage, probe));

    let router = routes::setup_routes(state.clone()).expect("Failed to setup routes");
    let server =
        TestServer::new(router.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
