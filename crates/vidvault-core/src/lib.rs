//! Vidvault Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every vidvault component.

pub mod config;
pub mod duration;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use duration::{format_duration, UNKNOWN_DURATION};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{VideoRecord, VideoView};
