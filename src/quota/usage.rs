//! Per-user usage calculation from object-store ground truth

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::QuotaError;
use crate::gateway::{profile_photo_prefix, recipe_image_prefix, ObjectStore};

/// Actual bytes and files a user has stored
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUsage {
    pub total_bytes: u64,
    pub file_count: u32,
}

/// Outcome of a best-effort usage calculation
///
/// `Unknown` means the object store could not be enumerated. Callers decide
/// what that means for them: soft admission checks treat it as zero, the
/// reconciler refuses to proceed and uses [`UsageCalculator::try_usage`]
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageReport {
    Computed(UserUsage),
    Unknown,
}

impl UsageReport {
    /// Usage for soft admission checks: unknown counts as zero
    pub fn or_zero(self) -> UserUsage {
        match self {
            UsageReport::Computed(usage) => usage,
            UsageReport::Unknown => UserUsage::default(),
        }
    }
}

/// Computes actual storage consumption for a single user
///
/// Enumerates the user's profile-photo and recipe-image prefixes and sums
/// object sizes. Metadata fetches within a prefix run concurrently and
/// complete or fail as a unit.
#[derive(Clone)]
pub struct UsageCalculator {
    objects: Arc<dyn ObjectStore>,
}

impl UsageCalculator {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects }
    }

    /// Best-effort usage for admission checks and UI
    ///
    /// Store failures are logged and reported as `Unknown`, never raised.
    pub async fn usage(&self, user_id: &str) -> UsageReport {
        match self.try_usage(user_id).await {
            Ok(usage) => UsageReport::Computed(usage),
            Err(err) => {
                tracing::warn!(user_id, error = %err, "usage calculation failed, reporting unknown");
                UsageReport::Unknown
            }
        }
    }

    /// Strict usage; any store failure propagates
    pub async fn try_usage(&self, user_id: &str) -> Result<UserUsage, QuotaError> {
        let mut usage = UserUsage::default();

        for prefix in [profile_photo_prefix(user_id), recipe_image_prefix(user_id)] {
            let paths = self.objects.list(&prefix).await?;
            let metadata =
                try_join_all(paths.iter().map(|path| self.objects.metadata(path))).await?;

            for item in &metadata {
                usage.total_bytes += item.size_bytes;
                usage.file_count += 1;
            }
        }

        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, MemoryObjectStore, StoredObjectMetadata};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;

    struct BrokenObjectStore;

    #[async_trait]
    impl ObjectStore for BrokenObjectStore {
        async fn list(&self, _prefix: &str) -> Result<Vec<String>, GatewayError> {
            Err(GatewayError::ObjectStore("listing failed".into()))
        }

        async fn metadata(&self, path: &str) -> Result<StoredObjectMetadata, GatewayError> {
            Err(GatewayError::ObjectNotFound(path.to_string()))
        }

        async fn upload(
            &self,
            _path: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
            _custom_metadata: HashMap<String, String>,
        ) -> Result<StoredObjectMetadata, GatewayError> {
            Err(GatewayError::ObjectStore("upload failed".into()))
        }

        async fn delete(&self, _path: &str) -> Result<(), GatewayError> {
            Err(GatewayError::ObjectStore("delete failed".into()))
        }

        async fn download_url(&self, path: &str) -> Result<String, GatewayError> {
            Err(GatewayError::ObjectNotFound(path.to_string()))
        }
    }

    #[tokio::test]
    async fn test_sums_both_prefixes() {
        let store = Arc::new(MemoryObjectStore::new());
        store.seed_object("profile-photos/u1/a.jpg", 100, Utc::now());
        store.seed_object("profile-photos/u1/b.jpg", 200, Utc::now());
        store.seed_object("recipe-images/u1/c.jpg", 300, Utc::now());
        store.seed_object("recipe-images/u2/other.jpg", 999, Utc::now());

        let calculator = UsageCalculator::new(store);
        let usage = calculator.try_usage("u1").await.unwrap();

        assert_eq!(usage.total_bytes, 600);
        assert_eq!(usage.file_count, 3);
    }

    #[tokio::test]
    async fn test_empty_user_is_zero_not_error() {
        let calculator = UsageCalculator::new(Arc::new(MemoryObjectStore::new()));
        let usage = calculator.try_usage("nobody").await.unwrap();
        assert_eq!(usage, UserUsage::default());
    }

    #[tokio::test]
    async fn test_store_failure_reports_unknown() {
        let calculator = UsageCalculator::new(Arc::new(BrokenObjectStore));
        assert_eq!(calculator.usage("u1").await, UsageReport::Unknown);
        assert_eq!(calculator.usage("u1").await.or_zero(), UserUsage::default());
    }

    #[tokio::test]
    async fn test_store_failure_propagates_from_strict_variant() {
        let calculator = UsageCalculator::new(Arc::new(BrokenObjectStore));
        assert!(calculator.try_usage("u1").await.is_err());
    }
}
