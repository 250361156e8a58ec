//! Upload admission control
//!
//! Checks a candidate upload against the per-file, project-wide and per-user
//! limits, cheapest first. The check is advisory: it is not atomic with the
//! upload that follows, so a concurrent upload can consume the remaining
//! quota in between and overshoot a limit by up to one file. Limits here are
//! soft UX guards, not security boundaries.

use serde::{Deserialize, Serialize};

use super::{format_bytes, ProjectCounter, QuotaError, UsageCalculator, UsageReport};
use crate::StorageLimits;

/// Byte usage snapshot returned with a decision, for UI display
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub user: u64,
    pub project: u64,
}

/// Which limit rejected the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    FileTooLarge,
    ProjectFull,
    UserQuotaExceeded,
}

/// Result of an admission check
#[derive(Debug, Clone)]
pub enum UploadDecision {
    Allowed {
        usage: UsageSnapshot,
    },
    Denied {
        reason: DenyReason,
        message: String,
        usage: Option<UsageSnapshot>,
    },
}

impl UploadDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, UploadDecision::Allowed { .. })
    }
}

/// Admission-control policy over the counter and the usage calculator
#[derive(Clone)]
pub struct QuotaEnforcer {
    limits: StorageLimits,
    counter: ProjectCounter,
    usage: UsageCalculator,
}

impl QuotaEnforcer {
    pub fn new(
        limits: StorageLimits,
        counter: ProjectCounter,
        usage: UsageCalculator,
    ) -> Result<Self, QuotaError> {
        limits.validate()?;
        Ok(Self {
            limits,
            counter,
            usage,
        })
    }

    pub fn limits(&self) -> &StorageLimits {
        &self.limits
    }

    /// Decide whether a candidate upload is admitted
    ///
    /// Checks short-circuit on the first failure: raw file size, then the
    /// project total, then per-user usage. The per-user enumeration is the
    /// expensive step and only runs once the cheaper checks pass.
    pub async fn check_upload(
        &self,
        user_id: &str,
        candidate_size: u64,
    ) -> Result<UploadDecision, QuotaError> {
        if candidate_size > self.limits.per_file_raw_limit {
            return Ok(UploadDecision::Denied {
                reason: DenyReason::FileTooLarge,
                message: format!(
                    "File size exceeds {} limit",
                    format_bytes(self.limits.per_file_raw_limit)
                ),
                usage: None,
            });
        }

        let project_bytes = self.counter.read().await?;
        if project_bytes.saturating_add(candidate_size) > self.limits.project_total_limit {
            return Ok(UploadDecision::Denied {
                reason: DenyReason::ProjectFull,
                message: format!(
                    "Project storage limit reached. {} / {} used.",
                    format_bytes(project_bytes),
                    format_bytes(self.limits.project_total_limit)
                ),
                usage: Some(UsageSnapshot {
                    user: 0,
                    project: project_bytes,
                }),
            });
        }

        let report = self.usage.usage(user_id).await;
        if report == UsageReport::Unknown {
            tracing::warn!(user_id, "user usage unknown, admitting against project limit only");
        }
        let user_bytes = report.or_zero().total_bytes;
        if user_bytes.saturating_add(candidate_size) > self.limits.per_user_limit {
            return Ok(UploadDecision::Denied {
                reason: DenyReason::UserQuotaExceeded,
                message: format!(
                    "Upload would exceed your {} limit. You've used {}.",
                    format_bytes(self.limits.per_user_limit),
                    format_bytes(user_bytes)
                ),
                usage: Some(UsageSnapshot {
                    user: user_bytes,
                    project: project_bytes,
                }),
            });
        }

        Ok(UploadDecision::Allowed {
            usage: UsageSnapshot {
                user: user_bytes,
                project: project_bytes,
            },
        })
    }
}
