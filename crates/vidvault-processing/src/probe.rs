use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to start probe: {0}")]
    Spawn(String),

    #[error("Probe exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Could not read duration from probe output: {0}")]
    Parse(String),

    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),
}

/// Reports the playback length of a media file.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn probe_seconds(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// Run `probe` against `path`, giving up after `timeout`.
///
/// The probe future is dropped on timeout, which kills any child process it spawned.
pub async fn probe_with_timeout(
    probe: &dyn DurationProbe,
    path: &Path,
    timeout: Duration,
) -> Result<f64, ProbeError> {
    tokio::time::timeout(timeout, probe.probe_seconds(path))
        .await
        .map_err(|_| ProbeError::Timeout(timeout))?
}
