//! Route prefixes and response messages shared by handlers and routing.

/// Prefix of the JSON API.
pub const API_PREFIX: &str = "/api";

/// Mount point of the static video files.
pub const VIDEOS_MOUNT: &str = "/videos";

pub const MSG_VIDEO_UPLOADED: &str = "Video uploaded successfully";
pub const MSG_DESCRIPTION_UPDATED: &str = "Description updated";
pub const MSG_VIDEO_DELETED: &str = "Video deleted";
pub const MSG_VIDEO_NOT_FOUND: &str = "Video not found";
