//! Retention cleanup for profile photos
//!
//! Bounds a user's stored profile photos to the most recent N. Freed bytes
//! are settled against the project counter with a single adjustment once
//! every delete has gone through.

use futures::future::try_join_all;
use std::sync::Arc;

use super::{ProjectCounter, QuotaError};
use crate::gateway::{profile_photo_prefix, ObjectStore};

/// What a cleanup pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub deleted: u32,
    pub bytes_freed: u64,
}

/// Deletes a user's oldest profile photos beyond a retention count
#[derive(Clone)]
pub struct RetentionCleaner {
    objects: Arc<dyn ObjectStore>,
    counter: ProjectCounter,
}

impl RetentionCleaner {
    pub fn new(objects: Arc<dyn ObjectStore>, counter: ProjectCounter) -> Self {
        Self { objects, counter }
    }

    /// Delete every profile photo beyond the `keep_count` newest
    ///
    /// A `keep_count` of zero deletes everything. The counter is adjusted
    /// once, after all deletes have succeeded; a failure part-way leaves the
    /// counter over-counting until the next reconciliation.
    pub async fn cleanup(
        &self,
        user_id: &str,
        keep_count: u32,
    ) -> Result<CleanupOutcome, QuotaError> {
        let prefix = profile_photo_prefix(user_id);
        let paths = self.objects.list(&prefix).await?;
        if paths.len() <= keep_count as usize {
            return Ok(CleanupOutcome::default());
        }

        let mut items =
            try_join_all(paths.iter().map(|path| self.objects.metadata(path))).await?;
        // newest first
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut outcome = CleanupOutcome::default();
        for item in items.iter().skip(keep_count as usize) {
            self.objects.delete(&item.path).await?;
            outcome.deleted += 1;
            outcome.bytes_freed += item.size_bytes;
        }

        if outcome.bytes_freed > 0 {
            self.counter.adjust(-(outcome.bytes_freed as i64)).await?;
        }

        tracing::info!(
            user_id,
            deleted = outcome.deleted,
            bytes_freed = outcome.bytes_freed,
            "retention cleanup complete"
        );
        Ok(outcome)
    }

    /// Best-effort cleanup for opportunistic call sites
    ///
    /// Failures are logged and reported as an empty outcome; callers are free
    /// to ignore the result entirely.
    pub async fn cleanup_best_effort(&self, user_id: &str, keep_count: u32) -> CleanupOutcome {
        match self.cleanup(user_id, keep_count).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(user_id, error = %err, "opportunistic cleanup failed");
                CleanupOutcome::default()
            }
        }
    }
}
