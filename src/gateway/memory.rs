//! In-memory gateway backends
//!
//! Process-local stand-ins for the hosted stores, used by the test suite and
//! for running the core without a cloud project. The document store pushes
//! records through JSON on every read and write so it behaves like a real
//! document database rather than a shared struct.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::collections::HashMap;

use super::{
    CompressionOptions, DocumentStore, GatewayError, ImageCompressor, ObjectStore,
    ProjectStorageRecord, RecordUpdate, StoredObjectMetadata,
};

/// Bucket name baked into generated download URLs
const MEMORY_BUCKET: &str = "recipe-vibe.appspot.com";

struct StoredObject {
    #[allow(dead_code)]
    bytes: Vec<u8>,
    metadata: StoredObjectMetadata,
}

/// In-memory object store
///
/// Objects live in a concurrent map keyed by full path. Download URLs follow
/// the hosted provider's `/o/` shape, so URL parsing round-trips against this
/// backend too.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, StoredObject>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Seed an object with an explicit creation time, bypassing upload
    ///
    /// Only metadata matters to accounting, so no payload is materialized.
    pub fn seed_object(&self, path: &str, size_bytes: u64, created_at: DateTime<Utc>) {
        self.objects.insert(
            path.to_string(),
            StoredObject {
                bytes: Vec::new(),
                metadata: StoredObjectMetadata {
                    path: path.to_string(),
                    size_bytes,
                    created_at,
                    content_type: "image/jpeg".to_string(),
                    custom_metadata: HashMap::new(),
                },
            },
        );
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, GatewayError> {
        let wanted = format!("{}/", prefix.trim_end_matches('/'));
        let mut paths: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(&wanted))
            .map(|entry| entry.key().clone())
            .collect();
        paths.sort();
        Ok(paths)
    }

    async fn metadata(&self, path: &str) -> Result<StoredObjectMetadata, GatewayError> {
        self.objects
            .get(path)
            .map(|entry| entry.metadata.clone())
            .ok_or_else(|| GatewayError::ObjectNotFound(path.to_string()))
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        custom_metadata: HashMap<String, String>,
    ) -> Result<StoredObjectMetadata, GatewayError> {
        let metadata = StoredObjectMetadata {
            path: path.to_string(),
            size_bytes: bytes.len() as u64,
            created_at: Utc::now(),
            content_type: content_type.to_string(),
            custom_metadata,
        };
        self.objects.insert(
            path.to_string(),
            StoredObject {
                bytes,
                metadata: metadata.clone(),
            },
        );
        Ok(metadata)
    }

    async fn delete(&self, path: &str) -> Result<(), GatewayError> {
        self.objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| GatewayError::ObjectNotFound(path.to_string()))
    }

    async fn download_url(&self, path: &str) -> Result<String, GatewayError> {
        if !self.objects.contains_key(path) {
            return Err(GatewayError::ObjectNotFound(path.to_string()));
        }
        let encoded = utf8_percent_encode(path, NON_ALPHANUMERIC);
        Ok(format!(
            "https://firebasestorage.googleapis.com/v0/b/{}/o/{}?alt=media",
            MEMORY_BUCKET, encoded
        ))
    }
}

/// In-memory document store
///
/// A single lock serializes record updates, which gives `update_storage` the
/// same linearizability the hosted store's transactions provide.
#[derive(Default)]
pub struct MemoryDocumentStore {
    storage_doc: Mutex<Option<serde_json::Value>>,
    users: Mutex<Vec<String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user identity in the known-users collection
    pub fn add_user(&self, user_id: &str) {
        let mut users = self.users.lock();
        if !users.iter().any(|existing| existing == user_id) {
            users.push(user_id.to_string());
        }
    }
}

fn encode_record(record: &ProjectStorageRecord) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(record).map_err(|e| GatewayError::DocumentStore(e.to_string()))
}

fn decode_record(value: &serde_json::Value) -> Result<ProjectStorageRecord, GatewayError> {
    serde_json::from_value(value.clone()).map_err(|e| GatewayError::DocumentStore(e.to_string()))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read_storage(&self) -> Result<Option<ProjectStorageRecord>, GatewayError> {
        let doc = self.storage_doc.lock();
        doc.as_ref().map(decode_record).transpose()
    }

    async fn update_storage(
        &self,
        apply: RecordUpdate<'_>,
    ) -> Result<ProjectStorageRecord, GatewayError> {
        let mut doc = self.storage_doc.lock();
        let current = doc.as_ref().map(decode_record).transpose()?;
        let updated = apply(current);
        *doc = Some(encode_record(&updated)?);
        Ok(updated)
    }

    async fn put_storage(&self, record: &ProjectStorageRecord) -> Result<(), GatewayError> {
        let mut doc = self.storage_doc.lock();
        *doc = Some(encode_record(record)?);
        Ok(())
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, GatewayError> {
        Ok(self.users.lock().clone())
    }
}

/// Pass-through compressor for hosts without a native codec
///
/// Returns the input unchanged; only useful where compression is optional.
#[derive(Default)]
pub struct NoopCompressor;

#[async_trait]
impl ImageCompressor for NoopCompressor {
    async fn compress(
        &self,
        bytes: Vec<u8>,
        _content_type: &str,
        _options: &CompressionOptions,
    ) -> Result<Vec<u8>, GatewayError> {
        Ok(bytes)
    }
}
