//! Store transactions
//!
//! A [`StoreTransaction`] keeps the store locked while the caller performs async work
//! between reading the collection and writing it back, such as removing a video file
//! before dropping its record.

use super::records::persist;
use super::StoreResult;
use std::path::Path;
use tokio::sync::MutexGuard;
use vidvault_core::VideoRecord;

/// Exclusive, uncommitted view of the record collection.
///
/// Changes made through [`records_mut`](Self::records_mut) become durable only on
/// [`commit`](Self::commit). Dropping the transaction discards them.
///
/// ```ignore
/// let mut tx = store.begin().await?;
/// tx.records_mut().retain(|r| r.id != id);
/// tx.commit().await?;
/// ```
pub struct StoreTransaction<'a> {
    path: &'a Path,
    _guard: MutexGuard<'a, ()>,
    records: Vec<VideoRecord>,
    committed: bool,
}

impl<'a> StoreTransaction<'a> {
    pub(crate) fn new(path: &'a Path, guard: MutexGuard<'a, ()>, records: Vec<VideoRecord>) -> Self {
        Self {
            path,
            _guard: guard,
            records,
            committed: false,
        }
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Vec<VideoRecord> {
        &mut self.records
    }

    /// Persist the collection and release the lock.
    pub async fn commit(mut self) -> StoreResult<Vec<VideoRecord>> {
        persist(self.path, &self.records).await?;
        self.committed = true;
        Ok(std::mem::take(&mut self.records))
    }
}

impl Drop for StoreTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            tracing::debug!(
                path = %self.path.display(),
                "Store transaction dropped without commit - changes discarded"
            );
        }
    }
}
