//! ffprobe-backed duration probe

use crate::probe::{DurationProbe, ProbeError};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

pub struct FfprobeDurationProbe {
    ffprobe_path: String,
}

impl FfprobeDurationProbe {
    pub fn new(ffprobe_path: impl Into<String>) -> Result<Self> {
        let ffprobe_path = ffprobe_path.into();

        if ffprobe_path.is_empty() || ffprobe_path.contains("..") {
            return Err(anyhow!("Invalid ffprobe_path: {}", ffprobe_path));
        }

        if !ffprobe_path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        }) {
            return Err(anyhow!("Invalid ffprobe_path: contains unsafe characters"));
        }

        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProbeError::Spawn(format!("{}: {}", self.ffprobe_path, e)))?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let duration = parse_ffprobe_duration(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            video_duration = duration,
            "Video probe completed"
        );

        Ok(duration)
    }
}

/// Extract `format.duration` (seconds) from ffprobe's JSON output.
pub fn parse_ffprobe_duration(stdout: &[u8]) -> Result<f64, ProbeError> {
    let probe_data: serde_json::Value =
        serde_json::from_slice(stdout).map_err(|e| ProbeError::Parse(e.to_string()))?;

    let raw = &probe_data["format"]["duration"];
    let duration = raw
        .as_str()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .or_else(|| raw.as_f64())
        .ok_or_else(|| ProbeError::Parse("missing format.duration".to_string()))?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(ProbeError::Parse(format!("invalid duration {}", duration)));
    }

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_string() {
        let out = br#"{"format": {"filename": "a.mp4", "duration": "125.700000"}}"#;
        assert_eq!(parse_ffprobe_duration(out).unwrap(), 125.7);
    }

    #[test]
    fn test_parse_duration_number() {
        let out = br#"{"format": {"duration": 75}}"#;
        assert_eq!(parse_ffprobe_duration(out).unwrap(), 75.0);
    }

    #[test]
    fn test_parse_rejects_missing_or_bad_duration() {
        assert!(matches!(parse_ffprobe_duration(b"{}"), Err(ProbeError::Parse(_))));
        assert!(matches!(
            parse_ffprobe_duration(br#"{"format": {"duration": "N/A"}}"#),
            Err(ProbeError::Parse(_))
        ));
        assert!(matches!(
            parse_ffprobe_duration(br#"{"format": {"duration": "-3"}}"#),
            Err(ProbeError::Parse(_))
        ));
        assert!(matches!(parse_ffprobe_duration(b"not json"), Err(ProbeError::Parse(_))));
    }

    #[test]
    fn test_new_rejects_unsafe_paths() {
        assert!(FfprobeDurationProbe::new("ffprobe; rm -rf /").is_err());
        assert!(FfprobeDurationProbe::new("../bin/ffprobe").is_err());
        assert!(FfprobeDurationProbe::new("").is_err());
        assert!(FfprobeDurationProbe::new("/usr/bin/ffprobe").is_ok());
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let probe = FfprobeDurationProbe::new("/nonexistent/vidvault-ffprobe").unwrap();
        let result = probe.probe_seconds(Path::new("a.mp4")).await;
        assert!(matches!(result, Err(ProbeError::Spawn(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failed() {
        let probe = FfprobeDurationProbe::new("false").unwrap();
        let result = probe.probe_seconds(Path::new("a.mp4")).await;
        assert!(matches!(result, Err(ProbeError::Failed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unexpected_output_is_parse_error() {
        // echo prints its arguments, which is not JSON.
        let probe = FfprobeDurationProbe::new("echo").unwrap();
        let result = probe.probe_seconds(Path::new("a.mp4")).await;
        assert!(matches!(result, Err(ProbeError::Parse(_))));
    }
}
