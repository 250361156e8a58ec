//! Image compression contract
//!
//! Compression happens before every upload; the codec itself lives in the
//! host. The core only relies on the contract: input bytes come back as
//! smaller bytes of the same media type.

use async_trait::async_trait;

use super::GatewayError;

/// Tuning for a compression pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionOptions {
    /// Output size the codec aims for, in bytes
    pub max_size_bytes: u64,

    /// Maximum width or height in pixels
    pub max_dimension: u32,

    /// Starting quality, 0.0 to 1.0
    pub initial_quality: f32,
}

impl CompressionOptions {
    /// Profile photos can be smaller
    pub fn profile_photo() -> Self {
        Self {
            max_size_bytes: 300 * 1024,
            max_dimension: 800,
            initial_quality: 0.85,
        }
    }

    /// Recipe images can be larger and higher quality than profile photos
    pub fn recipe_image() -> Self {
        Self {
            max_size_bytes: 1024 * 1024,
            max_dimension: 1920,
            initial_quality: 0.9,
        }
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_size_bytes: 512 * 1024,
            max_dimension: 1024,
            initial_quality: 0.8,
        }
    }
}

/// Image compression backend
#[async_trait]
pub trait ImageCompressor: Send + Sync {
    /// Shrink image bytes, keeping the media type
    async fn compress(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        options: &CompressionOptions,
    ) -> Result<Vec<u8>, GatewayError>;
}
