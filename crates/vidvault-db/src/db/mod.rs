//! Record store
//!
//! The whole collection lives in one pretty-printed JSON array. Every mutation goes
//! through [`RecordStore::commit`] or a [`StoreTransaction`], both of which hold the
//! store's single lock across the read-modify-write cycle.

use thiserror::Error;
use vidvault_core::AppError;

pub mod records;
pub mod transaction;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Metadata file is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to read metadata file: {0}")]
    Read(String),

    #[error("Failed to write metadata file: {0}")]
    Write(String),

    #[error("Failed to serialize records: {0}")]
    Serialize(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt(msg) => AppError::StoreCorrupt(msg),
            StoreError::Write(msg) | StoreError::Serialize(msg) => AppError::StoreWrite(msg),
            StoreError::Read(msg) => AppError::Internal(format!("Metadata read failed: {}", msg)),
        }
    }
}
