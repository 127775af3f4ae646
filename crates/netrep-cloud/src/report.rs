//! Progress and result types for replication runs and cleanups

use crate::model::ReplicationStatus;
use crate::resource::ResourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One side of the replication pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    Primary,
    Secondary,
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Site::Primary => write!(f, "Primary"),
            Site::Secondary => write!(f, "Secondary"),
        }
    }
}

/// How far provisioning of a site has progressed
///
/// Stages are ordered; a site at a given stage has completed every earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStage {
    NotStarted,
    AccountCreated,
    PoolCreated,
    VolumeCreated,
    VolumeReady,
    /// Secondary only
    ReplicationLinked,
}

impl std::fmt::Display for SiteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteStage::NotStarted => write!(f, "not started"),
            SiteStage::AccountCreated => write!(f, "account created"),
            SiteStage::PoolCreated => write!(f, "pool created"),
            SiteStage::VolumeCreated => write!(f, "volume created"),
            SiteStage::VolumeReady => write!(f, "volume ready"),
            SiteStage::ReplicationLinked => write!(f, "replication linked"),
        }
    }
}

/// Provisioning progress of one site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProgress {
    pub site: Site,
    pub stage: SiteStage,
    pub account_id: Option<ResourceId>,
    pub pool_id: Option<ResourceId>,
    pub volume_id: Option<ResourceId>,
}

impl SiteProgress {
    pub fn new(site: Site) -> Self {
        Self {
            site,
            stage: SiteStage::NotStarted,
            account_id: None,
            pool_id: None,
            volume_id: None,
        }
    }

    /// Move forward to `stage`; never moves backwards
    pub fn advance(&mut self, stage: SiteStage) {
        if stage > self.stage {
            tracing::debug!("{} site: {} -> {}", self.site, self.stage, stage);
            self.stage = stage;
        }
    }
}

/// Result of a replication run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub primary: SiteProgress,
    pub secondary: SiteProgress,
    /// Replication status once the link was established
    pub replication: Option<ReplicationStatus>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            primary: SiteProgress::new(Site::Primary),
            secondary: SiteProgress::new(Site::Secondary),
            replication: None,
        }
    }

    pub fn site(&self, site: Site) -> &SiteProgress {
        match site {
            Site::Primary => &self.primary,
            Site::Secondary => &self.secondary,
        }
    }

    pub fn site_mut(&mut self, site: Site) -> &mut SiteProgress {
        match site {
            Site::Primary => &mut self.primary,
            Site::Secondary => &mut self.secondary,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.secondary.stage == SiteStage::ReplicationLinked
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a cleanup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Successfully completed steps
    pub succeeded: Vec<StepResult>,

    /// Failed steps (at most one per site)
    pub failed: Vec<StepResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl CleanupReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, site: Site, step_id: impl Into<String>, message: impl Into<String>) {
        self.succeeded.push(StepResult {
            site,
            step_id: step_id.into(),
            message: message.into(),
            error: None,
        });
    }

    pub fn add_failure(&mut self, site: Site, step_id: impl Into<String>, error: impl Into<String>) {
        self.failed.push(StepResult {
            site,
            step_id: step_id.into(),
            message: String::new(),
            error: Some(error.into()),
        });
    }
}

/// Result of a single cleanup step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub site: Site,

    /// Step identifier, e.g. "delete-volume"
    pub step_id: String,

    /// Success message
    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_never_moves_backwards() {
        let mut progress = SiteProgress::new(Site::Primary);
        progress.advance(SiteStage::PoolCreated);
        progress.advance(SiteStage::AccountCreated);
        assert_eq!(progress.stage, SiteStage::PoolCreated);
        progress.advance(SiteStage::VolumeReady);
        assert_eq!(progress.stage, SiteStage::VolumeReady);
    }

    #[test]
    fn test_cleanup_report() {
        let mut report = CleanupReport::new();
        assert!(report.is_success());
        report.add_success(Site::Secondary, "delete-volume", "deleted");
        assert!(report.is_success());
        report.add_failure(Site::Primary, "delete-pool", "conflict");
        assert!(!report.is_success());
        assert_eq!(report.failed[0].error.as_deref(), Some("conflict"));
    }
}
