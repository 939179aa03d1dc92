//! Upload and mutation service tests, without HTTP.
//!
//! Run with: `cargo test -p vidvault-api --test services_test`

mod helpers;

use async_trait::async_trait;
use helpers::fixtures::fake_mp4;
use helpers::{video_files_in, FakeProbe, HangingProbe};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncRead;
use vidvault_api::{UploadService, VideoService};
use vidvault_core::AppError;
use vidvault_db::RecordStore;
use vidvault_processing::DurationProbe;
use vidvault_storage::{LocalStorage, Storage, StorageError, StorageResult, StoredFile};

/// Local storage whose deletes always fail.
struct UndeletableStorage(LocalStorage);

#[async_trait]
impl Storage for UndeletableStorage {
    async fn upload_stream(
        &self,
        original_filename: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<StoredFile> {
        self.0.upload_stream(original_filename, reader).await
    }

    async fn delete(&self, storage_name: &str) -> StorageResult<()> {
        Err(StorageError::DeleteFailed(format!(
            "Permission denied: {}",
            storage_name
        )))
    }

    async fn exists(&self, storage_name: &str) -> StorageResult<bool> {
        self.0.exists(storage_name).await
    }

    fn path_of(&self, storage_name: &str) -> StorageResult<PathBuf> {
        self.0.path_of(storage_name)
    }
}

struct Fixture {
    uploads: UploadService,
    videos: VideoService,
    video_dir: PathBuf,
    _temp_dir: TempDir,
}

async fn fixture_with(
    probe: Arc<dyn DurationProbe>,
    probe_timeout: Duration,
    wrap_storage: impl FnOnce(LocalStorage) -> Arc<dyn Storage>,
    metadata_path: impl FnOnce(&Path) -> PathBuf,
) -> Fixture {
    let temp_dir = tempfile::tempdir().unwrap();
    let video_dir = temp_dir.path().join("videos");
    let storage = wrap_storage(LocalStorage::new(&video_dir).await.unwrap());
    let store = Arc::new(RecordStore::new(metadata_path(temp_dir.path())));

    Fixture {
        uploads: UploadService::new(store.clone(), storage.clone(), probe, probe_timeout),
        videos: VideoService::new(store, storage),
        video_dir,
        _temp_dir: temp_dir,
    }
}

async fn fixture() -> Fixture {
    fixture_with(
        FakeProbe::seconds(75.0),
        Duration::from_secs(5),
        |local| Arc::new(local),
        |root| root.join("videos").join("metadata.json"),
    )
    .await
}

async fn upload(fixture: &Fixture, name: &str, description: Option<&str>) -> vidvault_core::VideoRecord {
    let mut reader = Cursor::new(fake_mp4(name));
    fixture
        .uploads
        .upload(name, &mut reader, description.map(str::to_string))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_upload_records_probed_duration() {
    let fixture = fixture().await;

    let record = upload(&fixture, "a.mp4", None).await;

    assert_eq!(record.duration, "01:15");
    assert_eq!(record.progress, 0);
    assert_eq!(record.description, "");
    assert!(fixture.video_dir.join(&record.storage_name).exists());
    assert_eq!(fixture.videos.list_records().await.unwrap(), vec![record]);
}

#[tokio::test]
async fn test_list_maps_records_to_views() {
    let fixture = fixture().await;
    let record = upload(&fixture, "a.mp4", Some("hello")).await;

    let views = fixture.videos.list("http://cdn.test/videos/").await.unwrap();

    assert_eq!(views.len(), 1);
    assert_eq!(
        views[0].url,
        format!("http://cdn.test/videos/{}", record.storage_name)
    );
    assert_eq!(views[0].description, "hello");
    assert_eq!(views[0].subtitle, "");
}

#[tokio::test]
async fn test_hung_probe_times_out_to_unknown_duration() {
    let fixture = fixture_with(
        Arc::new(HangingProbe),
        Duration::from_millis(50),
        |local| Arc::new(local),
        |root| root.join("videos").join("metadata.json"),
    )
    .await;

    let record = upload(&fixture, "slow.mp4", None).await;
    assert_eq!(record.duration, "00:00");
}

#[tokio::test]
async fn test_commit_failure_surfaces_upload_io_and_removes_file() {
    let fixture = fixture_with(
        FakeProbe::seconds(10.0),
        Duration::from_secs(5),
        |local| Arc::new(local),
        |root| root.join("missing").join("metadata.json"),
    )
    .await;

    let mut reader = Cursor::new(fake_mp4("a"));
    let result = fixture.uploads.upload("a.mp4", &mut reader, None).await;

    assert!(matches!(result, Err(AppError::UploadIo(_))));
    assert!(video_files_in(&fixture.video_dir).is_empty());
}

#[tokio::test]
async fn test_staged_upload_is_invisible_until_completed() {
    let fixture = fixture().await;

    let mut reader = Cursor::new(fake_mp4("staged"));
    let persisted = fixture.uploads.persist("staged.mp4", &mut reader).await.unwrap();
    assert!(fixture.video_dir.join(&persisted.storage_name).exists());
    assert!(fixture.videos.list_records().await.unwrap().is_empty());

    let record = fixture.uploads.complete(&persisted, None).await.unwrap();
    assert_eq!(record.storage_name, persisted.storage_name);
    assert_eq!(fixture.videos.list_records().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_complete_refuses_a_vanished_file() {
    let fixture = fixture().await;

    let mut reader = Cursor::new(fake_mp4("vanished"));
    let persisted = fixture.uploads.persist("vanished.mp4", &mut reader).await.unwrap();
    std::fs::remove_file(fixture.video_dir.join(&persisted.storage_name)).unwrap();

    let result = fixture.uploads.complete(&persisted, None).await;

    assert!(matches!(result, Err(AppError::UploadIo(_))));
    assert!(fixture.videos.list_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_discard_removes_persisted_file() {
    let fixture = fixture().await;

    let mut reader = Cursor::new(fake_mp4("gone"));
    let persisted = fixture.uploads.persist("gone.mp4", &mut reader).await.unwrap();
    fixture.uploads.discard(&persisted).await;

    assert!(!fixture.video_dir.join(&persisted.storage_name).exists());
}

#[tokio::test]
async fn test_delete_removes_record_and_file() {
    let fixture = fixture().await;
    let keep = upload(&fixture, "keep.mp4", None).await;
    let gone = upload(&fixture, "gone.mp4", None).await;

    let removed = fixture.videos.delete(gone.id).await.unwrap();

    assert_eq!(removed.id, gone.id);
    assert!(!fixture.video_dir.join(&gone.storage_name).exists());
    assert!(fixture.video_dir.join(&keep.storage_name).exists());
    assert_eq!(fixture.videos.list_records().await.unwrap(), vec![keep]);
}

#[tokio::test]
async fn test_failed_file_removal_keeps_record_and_file() {
    let fixture = fixture_with(
        FakeProbe::seconds(10.0),
        Duration::from_secs(5),
        |local| Arc::new(UndeletableStorage(local)),
        |root| root.join("videos").join("metadata.json"),
    )
    .await;
    let record = upload(&fixture, "stuck.mp4", None).await;

    let result = fixture.videos.delete(record.id).await;

    assert!(matches!(result, Err(AppError::DeleteIo(_))));
    assert!(fixture.video_dir.join(&record.storage_name).exists());
    assert_eq!(fixture.videos.list_records().await.unwrap(), vec![record]);
}

#[tokio::test]
async fn test_delete_retry_after_file_already_gone() {
    let fixture = fixture().await;
    let record = upload(&fixture, "a.mp4", None).await;
    std::fs::remove_file(fixture.video_dir.join(&record.storage_name)).unwrap();

    fixture.videos.delete(record.id).await.unwrap();
    assert!(fixture.videos.list_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let fixture = fixture().await;

    let result = fixture
        .videos
        .update_description(uuid::Uuid::new_v4(), Some("x".to_string()))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = fixture
        .videos
        .update_description(uuid::Uuid::new_v4(), None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_are_both_visible() {
    let fixture = Arc::new(fixture().await);
    let a = upload(&fixture, "a.mp4", None).await;
    let b = upload(&fixture, "b.mp4", None).await;

    let (ra, rb) = tokio::join!(
        {
            let fixture = fixture.clone();
            tokio::spawn(async move {
                fixture
                    .videos
                    .update_description(a.id, Some("first".to_string()))
                    .await
            })
        },
        {
            let fixture = fixture.clone();
            tokio::spawn(async move {
                fixture
                    .videos
                    .update_description(b.id, Some("second".to_string()))
                    .await
            })
        }
    );
    ra.unwrap().unwrap();
    rb.unwrap().unwrap();

    let records = fixture.videos.list_records().await.unwrap();
    assert_eq!(records[0].description, "first");
    assert_eq!(records[1].description, "second");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_are_all_recorded() {
    let fixture = Arc::new(fixture().await);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let fixture = fixture.clone();
            tokio::spawn(async move {
                let mut reader = Cursor::new(fake_mp4(&i.to_string()));
                fixture
                    .uploads
                    .upload("same.mp4", &mut reader, None)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut ids = std::collections::HashSet::new();
    let mut names = std::collections::HashSet::new();
    for handle in handles {
        let record = handle.await.unwrap();
        ids.insert(record.id);
        names.insert(record.storage_name);
    }

    assert_eq!(ids.len(), 16);
    assert_eq!(names.len(), 16);
    assert_eq!(fixture.videos.list_records().await.unwrap().len(), 16);
}
