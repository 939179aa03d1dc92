//! vidvault API library
//!
//! HTTP handlers, the upload and mutation services behind them, and application setup.

mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use services::{PersistedVideo, UploadService, VideoService};
pub use state::AppState;
