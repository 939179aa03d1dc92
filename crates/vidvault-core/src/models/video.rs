use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::duration::UNKNOWN_DURATION;

fn default_duration() -> String {
    UNKNOWN_DURATION.to_string()
}

/// One stored video as persisted in the metadata file.
///
/// Field names are camelCase on disk. Files written by the first version of the
/// service used `filename` for the storage name and carried a derived `url`; the
/// former is accepted as an alias and the latter is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: Uuid,
    #[serde(alias = "filename")]
    pub storage_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default)]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl VideoRecord {
    /// Build a freshly uploaded record with a new id and zero progress.
    pub fn new(storage_name: String, description: String, duration: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            storage_name,
            description,
            duration,
            progress: 0,
            subtitle: None,
        }
    }
}

/// Client-facing view of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    pub id: Uuid,
    pub filename: String,
    pub url: String,
    pub description: String,
    pub subtitle: String,
    pub duration: String,
    pub progress: u8,
}

impl VideoView {
    /// Map a stored record to its view, joining `base_url` with the storage name.
    pub fn from_record(record: &VideoRecord, base_url: &str) -> Self {
        let duration = if record.duration.is_empty() {
            UNKNOWN_DURATION.to_string()
        } else {
            record.duration.clone()
        };

        VideoView {
            id: record.id,
            filename: record.storage_name.clone(),
            url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                record.storage_name
            ),
            description: record.description.clone(),
            subtitle: record.subtitle.clone().unwrap_or_default(),
            duration,
            progress: record.progress.min(100),
        }
    }
}
