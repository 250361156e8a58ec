//! Project counter reconciliation
//!
//! The counter is an incrementally maintained cache; any missed adjustment
//! (a crash between upload and settle, a bug, manual edits in the store)
//! makes it drift. Recalculation walks every known user, sums ground truth
//! from the object store and overwrites the cached record. O(total objects)
//! across all users; run on demand, never on the hot path.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ProjectCounter, QuotaError, UsageCalculator};
use crate::gateway::DocumentStore;

/// Totals written back by a recalculation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub total_bytes: u64,
    pub total_files: u32,
    /// Users currently storing at least one object
    pub user_count: u32,
}

/// Recomputes the project aggregate from object-store ground truth
pub struct ProjectReconciler {
    documents: Arc<dyn DocumentStore>,
    usage: UsageCalculator,
    counter: ProjectCounter,
}

impl ProjectReconciler {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        usage: UsageCalculator,
        counter: ProjectCounter,
    ) -> Self {
        Self {
            documents,
            usage,
            counter,
        }
    }

    /// Recompute the totals and overwrite the cached record
    ///
    /// All-or-nothing: any store failure aborts before the overwrite, leaving
    /// the cached record as it was.
    pub async fn recalculate(&self) -> Result<ReconcileSummary, QuotaError> {
        let user_ids = self.documents.list_user_ids().await?;

        let mut summary = ReconcileSummary {
            total_bytes: 0,
            total_files: 0,
            user_count: 0,
        };
        for user_id in &user_ids {
            let usage = self.usage.try_usage(user_id).await?;
            if usage.file_count == 0 {
                continue;
            }
            summary.total_bytes += usage.total_bytes;
            summary.total_files += usage.file_count;
            summary.user_count += 1;
        }

        self.counter
            .overwrite(summary.total_bytes, summary.total_files)
            .await?;

        tracing::info!(
            users_scanned = user_ids.len(),
            users_with_objects = summary.user_count,
            total_bytes = summary.total_bytes,
            total_files = summary.total_files,
            "project storage recalculated"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MemoryDocumentStore, MemoryObjectStore};
    use chrono::Utc;

    struct Fixture {
        objects: Arc<MemoryObjectStore>,
        documents: Arc<MemoryDocumentStore>,
        counter: ProjectCounter,
        reconciler: ProjectReconciler,
    }

    fn fixture() -> Fixture {
        let objects = Arc::new(MemoryObjectStore::new());
        let documents = Arc::new(MemoryDocumentStore::new());
        let counter = ProjectCounter::new(documents.clone());
        let reconciler = ProjectReconciler::new(
            documents.clone(),
            UsageCalculator::new(objects.clone()),
            counter.clone(),
        );
        Fixture {
            objects,
            documents,
            counter,
            reconciler,
        }
    }

    #[tokio::test]
    async fn test_recalculate_repairs_a_drifted_counter() {
        let f = fixture();
        f.documents.add_user("u1");
        f.documents.add_user("u2");
        f.objects
            .seed_object("profile-photos/u1/a.jpg", 1000, Utc::now());
        f.objects
            .seed_object("recipe-images/u1/b.jpg", 2000, Utc::now());
        f.objects
            .seed_object("recipe-images/u2/c.jpg", 4000, Utc::now());

        // drifted cache: a missed adjustment left it far too low
        f.counter.adjust(10).await.unwrap();

        let summary = f.reconciler.recalculate().await.unwrap();

        assert_eq!(
            summary,
            ReconcileSummary {
                total_bytes: 7000,
                total_files: 3,
                user_count: 2,
            }
        );
        assert_eq!(f.counter.read().await.unwrap(), 7000);

        let record = f.documents.read_storage().await.unwrap().unwrap();
        assert_eq!(record.total_files, 3);
        assert!(record.last_recalculated.is_some());
    }

    #[tokio::test]
    async fn test_zero_object_users_are_iterated_but_not_counted() {
        let f = fixture();
        f.documents.add_user("active");
        f.documents.add_user("empty");
        f.objects
            .seed_object("recipe-images/active/a.jpg", 512, Utc::now());

        let summary = f.reconciler.recalculate().await.unwrap();

        assert_eq!(summary.user_count, 1);
        assert_eq!(summary.total_bytes, 512);
    }

    #[tokio::test]
    async fn test_recalculate_is_idempotent() {
        let f = fixture();
        f.documents.add_user("u1");
        f.objects
            .seed_object("profile-photos/u1/a.jpg", 123, Utc::now());
        f.objects
            .seed_object("recipe-images/u1/b.jpg", 456, Utc::now());

        let first = f.reconciler.recalculate().await.unwrap();
        let second = f.reconciler.recalculate().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            second.total_bytes,
            f.reconciler.usage.try_usage("u1").await.unwrap().total_bytes
        );
    }

    #[tokio::test]
    async fn test_no_users_writes_an_empty_record() {
        let f = fixture();
        f.counter.adjust(999).await.unwrap();

        let summary = f.reconciler.recalculate().await.unwrap();

        assert_eq!(summary.total_bytes, 0);
        assert_eq!(summary.user_count, 0);
        assert_eq!(f.counter.read().await.unwrap(), 0);
    }
}
