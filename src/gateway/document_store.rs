//! Document store gateway - the storage record and the user collection
//!
//! The accounting core keeps exactly one document in the store: the
//! project-wide storage record. Everything else it needs from the document
//! database is the list of known user identities.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GatewayError;

/// Project-wide storage accounting record
///
/// Singleton document owned by the counter and the reconciler. It is a cache:
/// ground truth is the sum of object sizes in the object store, and the two
/// can drift until a recalculation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStorageRecord {
    /// Cached total bytes across all users, clamped at zero
    pub total_bytes: u64,

    /// Cached total file count, maintained by reconciliation
    pub total_files: u32,

    /// When the record was last written
    pub last_updated: DateTime<Utc>,

    /// When ground truth was last recomputed, if ever
    pub last_recalculated: Option<DateTime<Utc>>,
}

impl ProjectStorageRecord {
    /// Fresh zeroed record
    pub fn empty() -> Self {
        Self {
            total_bytes: 0,
            total_files: 0,
            last_updated: Utc::now(),
            last_recalculated: None,
        }
    }
}

/// Pure transform applied to the storage record inside a store transaction
pub type RecordUpdate<'a> =
    &'a (dyn Fn(Option<ProjectStorageRecord>) -> ProjectStorageRecord + Send + Sync);

/// Document database backend (hosted store, emulator, in-memory)
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point-read the storage record; `None` when it has never been written
    async fn read_storage(&self) -> Result<Option<ProjectStorageRecord>, GatewayError>;

    /// Atomically transform the storage record
    ///
    /// The implementation runs `apply` inside its native transaction and may
    /// invoke it more than once under contention, so `apply` must be pure.
    /// Concurrent updates compose; no update is ever lost.
    async fn update_storage(
        &self,
        apply: RecordUpdate<'_>,
    ) -> Result<ProjectStorageRecord, GatewayError>;

    /// Unconditionally replace the storage record
    async fn put_storage(&self, record: &ProjectStorageRecord) -> Result<(), GatewayError>;

    /// List every known user identity
    async fn list_user_ids(&self) -> Result<Vec<String>, GatewayError>;
}
