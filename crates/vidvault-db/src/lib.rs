//! Durable record collection for video metadata.

pub mod db;

pub use db::records::RecordStore;
pub use db::transaction::StoreTransaction;
pub use db::{StoreError, StoreResult};
