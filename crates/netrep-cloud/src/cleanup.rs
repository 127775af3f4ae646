//! Reverse-order teardown of provisioned sites
//!
//! Sites are processed in the order given (Secondary before Primary, so the
//! destination side of the replication goes first). Within a site the order is
//! replication link → volume → pool → account, and every deletion is followed
//! by an absence wait. A failure stops the remaining steps of that site only;
//! nothing already deleted is restored.

use crate::error::{CloudError, Result};
use crate::poller::{Poller, Probe, WaitBudget};
use crate::provider::ResourceClient;
use crate::replication::SitePlan;
use crate::report::{CleanupReport, RunReport, Site, SiteProgress, SiteStage};
use crate::resource::{ResourceId, ResourceTarget};
use std::time::Duration;

/// Default wait for a deleted resource to disappear
pub const DELETION_BUDGET: WaitBudget = WaitBudget {
    interval: Duration::from_secs(60),
    max_attempts: 60,
};

/// Resources to delete on one site; `None` entries are skipped
#[derive(Debug, Clone)]
pub struct SiteTeardown {
    pub site: Site,
    /// Volume whose replication link should be removed
    pub replication: Option<ResourceId>,
    pub volume: Option<ResourceId>,
    pub pool: Option<ResourceId>,
    pub account: Option<ResourceId>,
}

impl SiteTeardown {
    /// Everything the plan describes, whether or not it exists
    pub fn full(plan: &SitePlan) -> Self {
        Self {
            site: plan.site,
            replication: Some(plan.volume.clone()),
            volume: Some(plan.volume.clone()),
            pool: Some(plan.pool.clone()),
            account: Some(plan.account.clone()),
        }
    }

    /// Only what a (possibly failed) run reports as created
    pub fn from_progress(progress: &SiteProgress) -> Self {
        let created = |stage: SiteStage| progress.stage >= stage;
        let volume = progress
            .volume_id
            .clone()
            .filter(|_| created(SiteStage::VolumeCreated));
        Self {
            site: progress.site,
            replication: volume.clone(),
            volume,
            pool: progress
                .pool_id
                .clone()
                .filter(|_| created(SiteStage::PoolCreated)),
            account: progress
                .account_id
                .clone()
                .filter(|_| created(SiteStage::AccountCreated)),
        }
    }

    /// Teardown order for a run: secondary first
    pub fn for_run(report: &RunReport) -> Vec<SiteTeardown> {
        vec![
            Self::from_progress(&report.secondary),
            Self::from_progress(&report.primary),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.replication.is_none()
            && self.volume.is_none()
            && self.pool.is_none()
            && self.account.is_none()
    }
}

/// Deletes sites in reverse dependency order
pub struct CleanupSequencer<'a, C: ResourceClient + ?Sized> {
    client: &'a C,
    poller: Poller<'a, C>,
    budget: WaitBudget,
}

impl<'a, C: ResourceClient + ?Sized> CleanupSequencer<'a, C> {
    pub fn new(client: &'a C, poller: Poller<'a, C>, budget: WaitBudget) -> Self {
        Self {
            client,
            poller,
            budget,
        }
    }

    /// Tear down every site in order
    ///
    /// Per-site failures are recorded in the report; only cancellation is
    /// returned as an error.
    pub async fn run(&self, sites: &[SiteTeardown]) -> Result<CleanupReport> {
        let mut report = CleanupReport::new();
        let start = std::time::Instant::now();

        for teardown in sites {
            if teardown.is_empty() {
                tracing::debug!("Nothing to clean up on {} site", teardown.site);
                continue;
            }
            tracing::info!("Performing clean up of {} resources", teardown.site);

            match self.teardown_site(teardown, &mut report).await {
                Ok(()) => {}
                Err(CloudError::Cancelled) => return Err(CloudError::Cancelled),
                Err(e) => {
                    tracing::error!(
                        "Clean up of {} site aborted: {}",
                        teardown.site,
                        e
                    );
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        if report.is_success() {
            tracing::info!("Cleanup completed!");
        }
        Ok(report)
    }

    async fn teardown_site(&self, teardown: &SiteTeardown, report: &mut CleanupReport) -> Result<()> {
        let site = teardown.site;

        if let Some(volume) = &teardown.replication {
            self.ensure_not_cancelled()?;
            let step = "delete-replication";
            tracing::info!("Removing data protection object from {}...", volume.name());
            let result = match volume.volume_ref() {
                Ok(volume_ref) => match self.client.delete_replication(&volume_ref).await {
                    Err(e) if e.is_replication_missing() || e.is_not_found() => {
                        tracing::debug!("No replication to delete on {}: {}", volume, e);
                        Ok(())
                    }
                    other => other,
                },
                Err(e) => Err(e),
            };
            self.step(site, step, volume, Probe::Replication, result, report)
                .await?;
            tracing::info!("Data replication successfully deleted");
        }

        if let Some(volume) = &teardown.volume {
            self.ensure_not_cancelled()?;
            tracing::info!("Removing volume {}...", volume);
            let result = match volume.volume_ref() {
                Ok(volume_ref) => self.client.delete_volume(&volume_ref).await,
                Err(e) => Err(e),
            };
            self.step(site, "delete-volume", volume, Probe::Existence, result, report)
                .await?;
            tracing::info!("Volume successfully deleted");
        }

        if let Some(pool) = &teardown.pool {
            self.ensure_not_cancelled()?;
            tracing::info!("Cleaning up capacity pool {}...", pool);
            let result = match pool.target() {
                ResourceTarget::Pool(pool_ref) => {
                    self.client.delete_pool(&pool_ref).await
                }
                _ => Err(CloudError::InvalidResourceId(format!(
                    "{} is not a capacity pool",
                    pool
                ))),
            };
            self.step(site, "delete-pool", pool, Probe::Existence, result, report)
                .await?;
            tracing::info!("Capacity pool successfully deleted");
        }

        if let Some(account) = &teardown.account {
            self.ensure_not_cancelled()?;
            tracing::info!("Cleaning up account {}...", account);
            let result = match account.target() {
                ResourceTarget::Account(account_ref) => {
                    self.client.delete_account(&account_ref).await
                }
                _ => Err(CloudError::InvalidResourceId(format!(
                    "{} is not an account",
                    account
                ))),
            };
            self.step(site, "delete-account", account, Probe::Existence, result, report)
                .await?;
            tracing::info!("Account successfully deleted");
        }

        Ok(())
    }

    /// No deletion is sent once the cancellation token has fired
    fn ensure_not_cancelled(&self) -> Result<()> {
        if self.poller.cancellation_token().is_cancelled() {
            return Err(CloudError::Cancelled);
        }
        Ok(())
    }

    /// Record a deletion result and wait for the resource to disappear
    async fn step(
        &self,
        site: Site,
        step: &str,
        id: &ResourceId,
        probe: Probe,
        deletion: Result<()>,
        report: &mut CleanupReport,
    ) -> Result<()> {
        let outcome = match deletion {
            Ok(()) => self.poller.poll(id, probe, &self.budget.absence()).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                report.add_success(site, step, format!("{} deleted", id.name()));
                Ok(())
            }
            Err(CloudError::Cancelled) => Err(CloudError::Cancelled),
            Err(e) => {
                report.add_failure(site, step, e.to_string());
                Err(e)
            }
        }
    }
}
