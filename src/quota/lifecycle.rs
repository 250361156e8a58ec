//! Image lifecycle orchestration
//!
//! Ties admission control, compression, upload and counter settlement into
//! the flows the app runs when an image is added, replaced or removed.

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    ProjectCounter, QuotaEnforcer, QuotaError, RetentionCleaner, UploadDecision,
};
use crate::gateway::{
    object_path_from_url, profile_photo_prefix, recipe_image_prefix, CompressionOptions,
    ImageCompressor, ObjectStore,
};

/// How many recent profile photos survive opportunistic cleanup
pub const PROFILE_PHOTO_RETAIN: u32 = 3;

/// The two image families the app stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    ProfilePhoto,
    RecipeImage,
}

impl ImageKind {
    fn prefix(&self, user_id: &str) -> String {
        match self {
            ImageKind::ProfilePhoto => profile_photo_prefix(user_id),
            ImageKind::RecipeImage => recipe_image_prefix(user_id),
        }
    }

    fn compression(&self) -> CompressionOptions {
        match self {
            ImageKind::ProfilePhoto => CompressionOptions::profile_photo(),
            ImageKind::RecipeImage => CompressionOptions::recipe_image(),
        }
    }
}

/// A successfully stored image
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub path: String,
    pub url: String,
    pub size_bytes: u64,
}

/// Outcome of [`ImageLifecycleManager::store_image`]
///
/// A quota rejection is normal control flow, not an error.
#[derive(Debug)]
pub enum UploadOutcome {
    Stored(StoredImage),
    Rejected(UploadDecision),
}

/// Orchestrates image storage and removal with quota accounting
pub struct ImageLifecycleManager {
    objects: Arc<dyn ObjectStore>,
    compressor: Arc<dyn ImageCompressor>,
    counter: ProjectCounter,
    enforcer: QuotaEnforcer,
    retention: RetentionCleaner,
}

impl ImageLifecycleManager {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        compressor: Arc<dyn ImageCompressor>,
        counter: ProjectCounter,
        enforcer: QuotaEnforcer,
        retention: RetentionCleaner,
    ) -> Self {
        Self {
            objects,
            compressor,
            counter,
            enforcer,
            retention,
        }
    }

    /// Delete the object behind a retrieval URL and settle the counter
    ///
    /// Returns the bytes freed. A URL that does not resolve to a store path
    /// frees nothing and is not an error: a stale or rewritten link must
    /// never block the caller's own deletion.
    pub async fn delete_by_url(&self, download_url: &str) -> Result<u64, QuotaError> {
        let Some(path) = object_path_from_url(download_url) else {
            tracing::debug!(download_url, "no object path in url, nothing to delete");
            return Ok(0);
        };

        let metadata = self.objects.metadata(&path).await?;
        self.objects.delete(&path).await?;
        self.counter.adjust(-(metadata.size_bytes as i64)).await?;

        Ok(metadata.size_bytes)
    }

    /// Compress and store an image, settling quota accounting
    ///
    /// The admission check runs against the raw size, before compression.
    /// Profile-photo uploads first kick off a detached retention pass that
    /// may free space but never blocks or fails the upload.
    pub async fn store_image(
        &self,
        user_id: &str,
        kind: ImageKind,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadOutcome, QuotaError> {
        let raw_size = bytes.len() as u64;
        let decision = self.enforcer.check_upload(user_id, raw_size).await?;
        if !decision.is_allowed() {
            return Ok(UploadOutcome::Rejected(decision));
        }

        if kind == ImageKind::ProfilePhoto {
            let retention = self.retention.clone();
            let owner = user_id.to_string();
            tokio::spawn(async move {
                retention
                    .cleanup_best_effort(&owner, PROFILE_PHOTO_RETAIN)
                    .await;
            });
        }

        let content_type = mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string();
        let compressed = self
            .compressor
            .compress(bytes, &content_type, &kind.compression())
            .await?;

        let path = format!("{}/{}", kind.prefix(user_id), object_name(filename));
        let mut custom_metadata = HashMap::new();
        custom_metadata.insert("uploaded-by".to_string(), user_id.to_string());
        custom_metadata.insert("raw-size".to_string(), raw_size.to_string());

        let stored = self
            .objects
            .upload(&path, compressed, &content_type, custom_metadata)
            .await?;
        self.counter.adjust(stored.size_bytes as i64).await?;
        let url = self.objects.download_url(&path).await?;

        Ok(UploadOutcome::Stored(StoredImage {
            path: stored.path,
            url,
            size_bytes: stored.size_bytes,
        }))
    }
}

/// Fresh object name keeping the original extension
fn object_name(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, extension)) if !extension.is_empty() => {
            format!("{}.{}", Uuid::new_v4(), extension)
        }
        _ => Uuid::new_v4().to_string(),
    }
}
