//! Cross-region replication orchestration
//!
//! Provisions account → pool → volume on the primary site, then on the
//! secondary site (as a data protection volume pointing at the primary), and
//! finally authorizes replication on the primary volume. Each asynchronous step
//! is bridged with a [`Poller`] wait. Any failure aborts the run; the caller
//! decides whether to clean up from the returned [`RunReport`].

use crate::error::{CloudError, Result};
use crate::model::{
    AccountSpec, DataProtection, MirrorState, PoolSpec, ProtocolType, ReplicationSchedule,
    ServiceLevel, VolumeSpec,
};
use crate::poller::{Poller, Probe, WaitBudget};
use crate::provider::ResourceClient;
use crate::report::{RunReport, Site, SiteStage};
use crate::resource::ResourceId;
use std::collections::HashMap;
use std::time::Duration;

/// API version used for the generic subnet lookup
pub const NETWORK_API_VERSION: &str = "2019-09-01";

/// Default wait for a new volume to become visible
pub const READINESS_BUDGET: WaitBudget = WaitBudget {
    interval: Duration::from_secs(60),
    max_attempts: 50,
};

/// What to provision on one site
#[derive(Debug, Clone)]
pub struct SitePlan {
    pub site: Site,
    pub location: String,
    pub subnet_id: String,
    pub service_level: ServiceLevel,
    pub account: ResourceId,
    pub pool: ResourceId,
    pub volume: ResourceId,
}

impl SitePlan {
    pub fn new(
        site: Site,
        location: impl Into<String>,
        subnet_id: impl Into<String>,
        service_level: ServiceLevel,
        account: ResourceId,
        pool_name: &str,
        volume_name: &str,
    ) -> Result<Self> {
        let pool = account.pool(pool_name);
        let volume = pool.volume(volume_name)?;
        Ok(Self {
            site,
            location: location.into(),
            subnet_id: subnet_id.into(),
            service_level,
            account,
            pool,
            volume,
        })
    }
}

/// Both sites plus the settings they share
#[derive(Debug, Clone)]
pub struct ReplicationPlan {
    pub primary: SitePlan,
    pub secondary: SitePlan,
    pub pool_size_bytes: u64,
    pub volume_size_bytes: u64,
    pub protocol_types: Vec<ProtocolType>,
    pub schedule: ReplicationSchedule,
    pub tags: HashMap<String, String>,
    /// Wait for new volumes and for the replication link
    pub readiness: WaitBudget,
    /// When set, also wait for the secondary to reach the Mirrored state
    pub mirror: Option<WaitBudget>,
}

impl ReplicationPlan {
    pub fn site(&self, site: Site) -> &SitePlan {
        match site {
            Site::Primary => &self.primary,
            Site::Secondary => &self.secondary,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.protocol_types.is_empty() {
            return Err(CloudError::InvalidConfig(
                "at least one protocol type is required".to_string(),
            ));
        }
        if self.primary.volume == self.secondary.volume {
            return Err(CloudError::InvalidConfig(
                "primary and secondary volumes must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Drives a [`ReplicationPlan`] against a [`ResourceClient`]
pub struct ReplicationOrchestrator<'a, C: ResourceClient + ?Sized> {
    client: &'a C,
    poller: Poller<'a, C>,
    plan: &'a ReplicationPlan,
}

impl<'a, C: ResourceClient + ?Sized> ReplicationOrchestrator<'a, C> {
    pub fn new(client: &'a C, poller: Poller<'a, C>, plan: &'a ReplicationPlan) -> Self {
        Self {
            client,
            poller,
            plan,
        }
    }

    /// Run the whole provisioning sequence, recording progress in `report`
    ///
    /// On error `report` still reflects every stage that completed.
    pub async fn run(&self, report: &mut RunReport) -> Result<()> {
        self.plan.validate()?;

        for site in [Site::Primary, Site::Secondary] {
            self.provision_site(site, report).await?;
        }

        self.link_replication(report).await?;

        if let Some(mirror) = self.plan.mirror {
            tracing::info!("Waiting for secondary volume to reach Mirrored state...");
            let status = self
                .poller
                .wait_for_mirror_state(
                    &self.plan.secondary.volume,
                    MirrorState::Mirrored,
                    mirror.interval,
                    mirror.max_attempts,
                )
                .await?;
            report.replication = Some(status);
        }

        report.finish();
        Ok(())
    }

    async fn provision_site(&self, site: Site, report: &mut RunReport) -> Result<()> {
        let plan = self.plan.site(site);
        tracing::info!("Working on {} resources...", site);

        self.check_subnet(plan).await?;

        tracing::info!("Creating {} account {}...", site, plan.account.name());
        let account = AccountSpec {
            id: plan.account.clone(),
            location: plan.location.clone(),
            tags: self.plan.tags.clone(),
        };
        self.client.create_account(&account).await?;
        let progress = report.site_mut(site);
        progress.account_id = Some(plan.account.clone());
        progress.advance(SiteStage::AccountCreated);
        tracing::info!("Account successfully created, resource id: {}", plan.account);

        tracing::info!("Creating {} capacity pool {}...", site, plan.pool.name());
        let pool = PoolSpec {
            id: plan.pool.clone(),
            location: plan.location.clone(),
            service_level: plan.service_level,
            size_bytes: self.plan.pool_size_bytes,
            tags: self.plan.tags.clone(),
        };
        self.client.create_pool(&pool).await?;
        let progress = report.site_mut(site);
        progress.pool_id = Some(plan.pool.clone());
        progress.advance(SiteStage::PoolCreated);
        tracing::info!("Capacity pool successfully created, resource id: {}", plan.pool);

        let data_protection = match site {
            Site::Primary => None,
            Site::Secondary => {
                let primary = &self.plan.primary;
                tracing::info!(
                    "Creating data protection volume, remote volume id is {}",
                    primary.volume
                );
                Some(DataProtection::destination_of(
                    &primary.volume,
                    primary.location.clone(),
                    self.plan.schedule,
                ))
            }
        };

        tracing::info!("Creating {} volume {}...", site, plan.volume.name());
        let volume = VolumeSpec {
            id: plan.volume.clone(),
            location: plan.location.clone(),
            service_level: plan.service_level,
            subnet_id: plan.subnet_id.clone(),
            protocol_types: self.plan.protocol_types.clone(),
            usage_threshold_bytes: self.plan.volume_size_bytes,
            unix_read_only: false,
            unix_read_write: true,
            snapshot_id: None,
            data_protection,
            tags: self.plan.tags.clone(),
        };
        self.client.create_volume(&volume).await?;
        let progress = report.site_mut(site);
        progress.volume_id = Some(plan.volume.clone());
        progress.advance(SiteStage::VolumeCreated);
        tracing::info!("Volume successfully created, resource id: {}", plan.volume);

        tracing::info!("Waiting for {} volume to be ready...", site);
        self.poller
            .poll(&plan.volume, Probe::Existence, &self.plan.readiness.presence())
            .await?;
        report.site_mut(site).advance(SiteStage::VolumeReady);

        Ok(())
    }

    async fn check_subnet(&self, plan: &SitePlan) -> Result<()> {
        tracing::info!("Checking if vnet/subnet {} exists", plan.subnet_id);
        match self
            .client
            .get_resource_by_id(&plan.subnet_id, NETWORK_API_VERSION)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(CloudError::SubnetNotFound {
                site: plan.site.to_string(),
                subnet: plan.subnet_id.clone(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn link_replication(&self, report: &mut RunReport) -> Result<()> {
        let primary = &self.plan.primary;
        let secondary = &self.plan.secondary;

        tracing::info!("Authorizing replication...");
        let source = primary.volume.volume_ref()?;
        self.client
            .authorize_replication(&source, &secondary.volume.to_string())
            .await?;

        tracing::info!("Waiting for primary volume replication to be ready...");
        self.poller
            .poll(
                &primary.volume,
                Probe::Replication,
                &self.plan.readiness.presence(),
            )
            .await?;
        report.secondary.advance(SiteStage::ReplicationLinked);

        Ok(())
    }
}
