//! Quota module - storage accounting and admission control
//!
//! Tracks aggregate and per-user storage consumption against tiered limits,
//! gates uploads before they happen, reclaims space through retention
//! cleanup, and reconciles the cached project counter against ground truth
//! in the object store.

mod counter;
mod enforcer;
mod format;
mod lifecycle;
mod reconcile;
mod retention;
mod usage;

pub use counter::ProjectCounter;
pub use enforcer::{DenyReason, QuotaEnforcer, UploadDecision, UsageSnapshot};
pub use format::{format_bytes, format_bytes_precision};
pub use lifecycle::{
    ImageKind, ImageLifecycleManager, StoredImage, UploadOutcome, PROFILE_PHOTO_RETAIN,
};
pub use reconcile::{ProjectReconciler, ReconcileSummary};
pub use retention::{CleanupOutcome, RetentionCleaner};
pub use usage::{UsageCalculator, UsageReport, UserUsage};

use crate::gateway::GatewayError;
use crate::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuotaError {
    #[error("Storage gateway failure: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid storage limits: {0}")]
    Config(#[from] ConfigError),
}
