//! Business operations behind the HTTP handlers.
//!
//! Keeps handler logic thin and allows unit testing without HTTP.

pub mod upload;
pub mod videos;

pub use upload::{PersistedVideo, UploadService};
pub use videos::VideoService;
