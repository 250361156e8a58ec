//! Project-wide storage counter
//!
//! The authoritative cached aggregate is a singleton record in the document
//! store. Adjustments go through the store's transactional primitive so that
//! concurrent uploads and deletes compose without lost updates; a plain
//! read-then-write here would silently corrupt the total under load.

use chrono::Utc;
use std::sync::Arc;

use super::QuotaError;
use crate::gateway::{DocumentStore, ProjectStorageRecord};

/// Maintains the cached project-wide total
#[derive(Clone)]
pub struct ProjectCounter {
    documents: Arc<dyn DocumentStore>,
}

impl ProjectCounter {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Cached project-wide total in bytes; 0 when the record does not exist
    ///
    /// The value is a snapshot and may be stale relative to in-flight
    /// adjustments.
    pub async fn read(&self) -> Result<u64, QuotaError> {
        let record = self.documents.read_storage().await?;
        Ok(record.map(|r| r.total_bytes).unwrap_or(0))
    }

    /// Atomically apply a byte delta, clamped at zero; returns the new total
    ///
    /// Also bumps `last_updated`. The file count and recalculation stamp are
    /// left for the reconciler.
    pub async fn adjust(&self, delta_bytes: i64) -> Result<u64, QuotaError> {
        let record = self
            .documents
            .update_storage(&move |current| {
                let mut record = current.unwrap_or_else(ProjectStorageRecord::empty);
                record.total_bytes = apply_delta(record.total_bytes, delta_bytes);
                record.last_updated = Utc::now();
                record
            })
            .await?;

        Ok(record.total_bytes)
    }

    /// Unconditionally replace the cached totals
    ///
    /// Reconciliation only; stamps `last_recalculated`.
    pub async fn overwrite(
        &self,
        total_bytes: u64,
        total_files: u32,
    ) -> Result<ProjectStorageRecord, QuotaError> {
        let now = Utc::now();
        let record = ProjectStorageRecord {
            total_bytes,
            total_files,
            last_updated: now,
            last_recalculated: Some(now),
        };
        self.documents.put_storage(&record).await?;
        Ok(record)
    }
}

fn apply_delta(current: u64, delta: i64) -> u64 {
    if delta >= 0 {
        current.saturating_add(delta as u64)
    } else {
        current.saturating_sub(delta.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryDocumentStore;

    fn counter() -> (Arc<MemoryDocumentStore>, ProjectCounter) {
        let docs = Arc::new(MemoryDocumentStore::new());
        (docs.clone(), ProjectCounter::new(docs))
    }

    #[tokio::test]
    async fn test_read_without_record_is_zero() {
        let (_docs, counter) = counter();
        assert_eq!(counter.read().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_adjust_creates_record_and_accumulates() {
        let (_docs, counter) = counter();
        assert_eq!(counter.adjust(1000).await.unwrap(), 1000);
        assert_eq!(counter.adjust(500).await.unwrap(), 1500);
        assert_eq!(counter.adjust(-300).await.unwrap(), 1200);
        assert_eq!(counter.read().await.unwrap(), 1200);
    }

    #[tokio::test]
    async fn test_negative_total_clamps_at_zero() {
        let (_docs, counter) = counter();
        counter.adjust(100).await.unwrap();
        assert_eq!(counter.adjust(-5000).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_adjust_preserves_reconciliation_fields() {
        let (docs, counter) = counter();
        counter.overwrite(4096, 7).await.unwrap();
        counter.adjust(1024).await.unwrap();

        let record = docs.read_storage().await.unwrap().unwrap();
        assert_eq!(record.total_bytes, 5120);
        assert_eq!(record.total_files, 7);
        assert!(record.last_recalculated.is_some());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_unconditionally() {
        let (docs, counter) = counter();
        counter.adjust(999_999).await.unwrap();

        let record = counter.overwrite(2048, 2).await.unwrap();
        assert_eq!(record.total_bytes, 2048);
        assert_eq!(docs.read_storage().await.unwrap().unwrap().total_bytes, 2048);
    }

    // Conservation: concurrent deltas all land, regardless of interleaving.
    #[tokio::test]
    async fn test_concurrent_adjusts_lose_nothing() {
        let (_docs, counter) = counter();
        // headroom so the zero clamp never bites mid-run
        counter.adjust(10_000).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..50i64 {
            let counter = counter.clone();
            let delta = if i % 2 == 0 { 150 } else { -50 };
            handles.push(tokio::spawn(async move {
                counter.adjust(delta).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(
            counter.read().await.unwrap(),
            10_000u64 + 25 * 150 - 25 * 50
        );
    }
}
