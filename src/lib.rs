//! Recipe Vibe Core - storage quota accounting
//!
//! This crate provides the storage accounting core for the Recipe Vibe app:
//! admission control for image uploads against tiered limits, a transactional
//! project-wide byte counter, retention cleanup of old profile photos, and
//! reconciliation of the cached counter against object-store ground truth.
//!
//! The hosted document store, object store and image codec stay behind the
//! traits in [`gateway`]; the accounting logic lives in [`quota`]. The crate
//! exposes no wire protocol of its own - request handlers in the app shell
//! call straight into it.

pub mod gateway;
pub mod quota;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Recipe Vibe core operations
#[derive(Error, Debug)]
pub enum RecipeVibeError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] gateway::GatewayError),

    #[error("Quota error: {0}")]
    Quota(#[from] quota::QuotaError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecipeVibeError>;

/// Storage limits misconfiguration
///
/// Not expected at runtime: limits ship as process-wide constants.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be non-zero")]
    ZeroLimit(&'static str),

    #[error("per-file limit ({per_file}) exceeds per-user limit ({per_user})")]
    FileAboveUser { per_file: u64, per_user: u64 },

    #[error("per-user limit ({per_user}) exceeds project limit ({project})")]
    UserAboveProject { per_user: u64, project: u64 },
}

/// Process-wide storage limits, fixed at startup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageLimits {
    /// Total bytes allowed across all users combined
    pub project_total_limit: u64,

    /// Bytes allowed per user
    pub per_user_limit: u64,

    /// Raw (pre-compression) bytes allowed per file at selection time
    pub per_file_raw_limit: u64,

    /// Stored size the compression profiles aim for per file
    pub per_file_compressed_target: u64,
}

impl Default for StorageLimits {
    fn default() -> Self {
        Self {
            project_total_limit: 5 * 1024 * 1024 * 1024, // 5 GB free tier
            per_user_limit: 100 * 1024 * 1024,           // 100 MB per user
            per_file_raw_limit: 10 * 1024 * 1024,        // 10 MB per selected file
            per_file_compressed_target: 512 * 1024,      // ~512 KB stored
        }
    }
}

impl StorageLimits {
    /// Check the limits are internally consistent
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.project_total_limit == 0 {
            return Err(ConfigError::ZeroLimit("project_total_limit"));
        }
        if self.per_user_limit == 0 {
            return Err(ConfigError::ZeroLimit("per_user_limit"));
        }
        if self.per_file_raw_limit == 0 {
            return Err(ConfigError::ZeroLimit("per_file_raw_limit"));
        }
        if self.per_file_compressed_target == 0 {
            return Err(ConfigError::ZeroLimit("per_file_compressed_target"));
        }
        if self.per_file_raw_limit > self.per_user_limit {
            return Err(ConfigError::FileAboveUser {
                per_file: self.per_file_raw_limit,
                per_user: self.per_user_limit,
            });
        }
        if self.per_user_limit > self.project_total_limit {
            return Err(ConfigError::UserAboveProject {
                per_user: self.per_user_limit,
                project: self.project_total_limit,
            });
        }
        Ok(())
    }
}

/// Install a global tracing subscriber driven by `RUST_LOG`
///
/// For embedding hosts that have no subscriber of their own. Calling it more
/// than once is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
