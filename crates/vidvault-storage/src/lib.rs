//! Vidvault Storage Library
//!
//! This crate owns the raw video files. It provides the [`Storage`] trait and a
//! local filesystem implementation.
//!
//! # Storage name format
//!
//! Every stored file lives directly under the storage directory as
//! `{unix_millis}-{sequence}-{sanitized original filename}`. Names must not contain
//! `..`, `/` or `\`. Name generation is centralized in the `keys` module.

pub(crate) mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::sanitize_filename;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult, StoredFile};
