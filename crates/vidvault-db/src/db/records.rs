use super::transaction::StoreTransaction;
use super::{StoreError, StoreResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;
use vidvault_core::VideoRecord;

/// JSON-backed, insertion-ordered collection of [`VideoRecord`]s.
///
/// Writers are serialized by an in-process lock. Readers never take it: the canonical
/// file is only ever replaced by an atomic rename, so a read sees either the previous
/// or the next committed version.
pub struct RecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current collection, creating an empty one on first use.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> StoreResult<Vec<VideoRecord>> {
        if let Some(records) = read_records(&self.path).await? {
            return Ok(records);
        }

        let _guard = self.lock.lock().await;
        self.load_locked().await
    }

    pub async fn find(&self, id: Uuid) -> StoreResult<Option<VideoRecord>> {
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }

    /// Apply `mutation` to a freshly loaded collection and persist the result.
    ///
    /// The whole cycle runs under the store lock. When `mutation` returns `Err` nothing
    /// is written and the error is handed back unchanged.
    pub async fn commit<T, E, F>(&self, mutation: F) -> Result<(T, Vec<VideoRecord>), E>
    where
        F: FnOnce(&mut Vec<VideoRecord>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load_locked().await?;

        let output = mutation(&mut records)?;
        persist(&self.path, &records).await?;

        Ok((output, records))
    }

    /// Start a multi-step mutation that keeps the store locked until it is committed
    /// or dropped.
    pub async fn begin(&self) -> StoreResult<StoreTransaction<'_>> {
        let guard = self.lock.lock().await;
        let records = self.load_locked().await?;
        Ok(StoreTransaction::new(&self.path, guard, records))
    }

    /// Caller must hold `self.lock`.
    async fn load_locked(&self) -> StoreResult<Vec<VideoRecord>> {
        match read_records(&self.path).await? {
            Some(records) => Ok(records),
            None => {
                tracing::info!(path = %self.path.display(), "Initializing empty metadata file");
                let records = Vec::new();
                persist(&self.path, &records).await?;
                Ok(records)
            }
        }
    }
}

/// `Ok(None)` when the file does not exist yet.
async fn read_records(path: &Path) -> StoreResult<Option<Vec<VideoRecord>>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StoreError::Read(format!("{}: {}", path.display(), e)));
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))
}

/// Write `records` next to `path` and rename the result over it.
pub(crate) async fn persist(path: &Path, records: &[VideoRecord]) -> StoreResult<()> {
    let start = Instant::now();
    let json = serde_json::to_vec_pretty(records).map_err(|e| StoreError::Serialize(e.to_string()))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StoreError::Write(format!("invalid metadata path {}", path.display())))?;
    let tmp_path = path.with_file_name(format!("{}.{}.tmp", file_name, Uuid::new_v4()));

    if let Err(e) = write_synced(&tmp_path, &json).await {
        discard_temp(&tmp_path).await;
        return Err(StoreError::Write(format!("{}: {}", tmp_path.display(), e)));
    }

    if let Err(e) = fs::rename(&tmp_path, path).await {
        discard_temp(&tmp_path).await;
        return Err(StoreError::Write(format!("{}: {}", path.display(), e)));
    }

    // The rename has landed; a failed directory sync only weakens durability.
    if let Err(e) = sync_parent_dir(path).await {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to sync metadata directory after rename"
        );
    }

    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        size_bytes = json.len(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Metadata persisted"
    );

    Ok(())
}

/// Flush the directory entry created by the rename.
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::File::open(parent).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn discard_temp(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary metadata file");
        }
    }
}
