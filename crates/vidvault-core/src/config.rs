//! Configuration module
//!
//! Settings are read from the process environment (and a `.env` file when present)
//! once at startup, then validated before anything touches the disk.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const SERVER_PORT: u16 = 3000;
const VIDEO_DIR: &str = "videos";
const METADATA_FILENAME: &str = "metadata.json";
const PROBE_TIMEOUT_SECS: u64 = 10;
const MAX_VIDEO_SIZE_MB: usize = 500;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Directory holding the raw video files.
    pub video_dir: PathBuf,
    /// JSON file holding the ordered record collection.
    pub metadata_file: PathBuf,
    /// Base URL used to build playable links. Derived from the request host when unset.
    pub public_base_url: Option<String>,
    pub ffprobe_path: String,
    pub probe_timeout: Duration,
    pub max_video_size_bytes: usize,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let video_dir = PathBuf::from(env::var("VIDEO_DIR").unwrap_or_else(|_| VIDEO_DIR.to_string()));
        let metadata_file = env::var("METADATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| video_dir.join(METADATA_FILENAME));

        let config = Config {
            server_port: env_setting("PORT", SERVER_PORT)?,
            environment,
            cors_origins,
            video_dir,
            metadata_file,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            probe_timeout: Duration::from_secs(env_setting("PROBE_TIMEOUT_SECS", PROBE_TIMEOUT_SECS)?),
            max_video_size_bytes: mb_to_bytes(env_setting("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)?)?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Configuration rooted at `video_dir`, with every other setting at its default.
    pub fn for_video_dir(video_dir: impl AsRef<Path>) -> Self {
        let video_dir = video_dir.as_ref().to_path_buf();
        Config {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            metadata_file: video_dir.join(METADATA_FILENAME),
            video_dir,
            public_base_url: None,
            ffprobe_path: "ffprobe".to_string(),
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * 1024 * 1024,
            log_format: "pretty".to_string(),
        }
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.video_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("VIDEO_DIR must not be empty"));
        }

        if self.metadata_file.file_name().is_none() {
            return Err(anyhow::anyhow!("METADATA_FILE must name a file"));
        }

        if self.probe_timeout.is_zero() {
            return Err(anyhow::anyhow!("PROBE_TIMEOUT_SECS must be greater than zero"));
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }

        if let Some(url) = &self.public_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "PUBLIC_BASE_URL must start with http:// or https://"
                ));
            }
        }

        Ok(())
    }
}

fn env_setting<T: FromStr>(name: &str, default: T) -> Result<T, anyhow::Error> {
    parse_setting(name, env::var(name).ok(), default)
}

/// Parse a numeric setting; unset or blank falls back to `default`, garbage is an error.
fn parse_setting<T: FromStr>(
    name: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, anyhow::Error> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", name, value)),
    }
}

fn mb_to_bytes(mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_VIDEO_SIZE_MB is too large: {}", mb))
}
