//! Gateway module - external collaborator contracts
//!
//! The core never talks to hosted services directly; the document store,
//! object store and image codec all sit behind these seams, with in-memory
//! backends for tests and host-less development.

mod compressor;
mod document_store;
mod download_url;
mod memory;
mod object_store;

pub use compressor::{CompressionOptions, ImageCompressor};
pub use document_store::{DocumentStore, ProjectStorageRecord, RecordUpdate};
pub use download_url::object_path_from_url;
pub use memory::{MemoryDocumentStore, MemoryObjectStore, NoopCompressor};
pub use object_store::{
    profile_photo_prefix, recipe_image_prefix, ObjectStore, StoredObjectMetadata,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Object store unavailable: {0}")]
    ObjectStore(String),

    #[error("Document store unavailable: {0}")]
    DocumentStore(String),

    #[error("Image compression failed: {0}")]
    Compression(String),
}
