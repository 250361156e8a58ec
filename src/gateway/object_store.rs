//! Object store gateway - binary object storage contract
//!
//! The hosted bucket is path-addressed: objects live under per-user prefixes
//! and carry immutable metadata from upload until deletion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::GatewayError;

/// Metadata for a stored binary object
///
/// Created on upload, immutable, destroyed with the object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObjectMetadata {
    /// Full path within the store
    pub path: String,

    /// Stored size in bytes
    pub size_bytes: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// MIME content type
    pub content_type: String,

    /// Caller-supplied metadata attached at upload
    pub custom_metadata: HashMap<String, String>,
}

/// Path prefix holding a user's profile photos
pub fn profile_photo_prefix(user_id: &str) -> String {
    format!("profile-photos/{}", user_id)
}

/// Path prefix holding a user's recipe images
pub fn recipe_image_prefix(user_id: &str) -> String {
    format!("recipe-images/{}", user_id)
}

/// Binary object store backend (hosted bucket, emulator, in-memory)
///
/// All implementations must be thread-safe (Send + Sync) for use in async
/// contexts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List the full paths of every object under a prefix
    ///
    /// A prefix with no objects yields an empty list, not an error.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, GatewayError>;

    /// Fetch metadata for a single object
    async fn metadata(&self, path: &str) -> Result<StoredObjectMetadata, GatewayError>;

    /// Upload an object and return its stored metadata
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        custom_metadata: HashMap<String, String>,
    ) -> Result<StoredObjectMetadata, GatewayError>;

    /// Delete an object
    async fn delete(&self, path: &str) -> Result<(), GatewayError>;

    /// Resolve the stable retrieval URL for an object
    async fn download_url(&self, path: &str) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prefixes() {
        assert_eq!(profile_photo_prefix("uid123"), "profile-photos/uid123");
        assert_eq!(recipe_image_prefix("uid123"), "recipe-images/uid123");
    }
}
