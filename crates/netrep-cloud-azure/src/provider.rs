//! Azure NetApp Files implementation of [`ResourceClient`]

use crate::client::ArmClient;
use crate::credentials::AzureCredentials;
use crate::error::Result as AzureResult;
use crate::models::{
    AccountBody, ArmResource, AuthorizeReplicationBody, PoolBody, SnapshotBody, VolumeBody,
};
use async_trait::async_trait;
use netrep_cloud::{
    AccountRef, AccountSpec, NETAPP_PROVIDER, PoolRef, PoolSpec, ReplicationStatus,
    ResourceClient, ResourceId, ResourceSnapshot, Result, SnapshotRef, SnapshotSpec, VolumeRef, VolumeSpec,
};

/// API version of the Microsoft.NetApp resource provider
pub const NETAPP_API_VERSION: &str = "2019-11-01";

pub struct AzureNetAppFiles {
    client: ArmClient,
    subscription_id: String,
}

impl AzureNetAppFiles {
    pub fn new(credentials: &AzureCredentials) -> AzureResult<Self> {
        Ok(Self::with_client(
            ArmClient::new(credentials)?,
            credentials.subscription_id.clone(),
        ))
    }

    pub fn with_client(client: ArmClient, subscription_id: impl Into<String>) -> Self {
        Self {
            client,
            subscription_id: subscription_id.into(),
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn account_path(&self, account: &AccountRef) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}/netAppAccounts/{}",
            self.subscription_id, account.resource_group, NETAPP_PROVIDER, account.account
        )
    }

    fn pool_path(&self, pool: &PoolRef) -> String {
        format!("{}/capacityPools/{}", self.account_path(&pool.account), pool.pool)
    }

    fn volume_path(&self, volume: &VolumeRef) -> String {
        format!("{}/volumes/{}", self.pool_path(&volume.pool), volume.volume)
    }

    fn snapshot_path(&self, snapshot: &SnapshotRef) -> String {
        format!(
            "{}/snapshots/{}",
            self.volume_path(&snapshot.volume),
            snapshot.snapshot
        )
    }

    async fn get_snapshot_of(&self, path: &str) -> Result<ResourceSnapshot> {
        let resource: ArmResource = self.client.get(path, NETAPP_API_VERSION).await?;
        Ok(resource.into())
    }

    async fn action(&self, operation: &str, volume: &VolumeRef, action: &str) -> Result<()> {
        let path = format!("{}/{}", self.volume_path(volume), action);
        self.client
            .post::<()>(operation, &path, NETAPP_API_VERSION, None)
            .await?;
        Ok(())
    }
}

/// Snapshot of a freshly created resource
///
/// Uses the body the service echoed on PUT. Without one, the snapshot is
/// built from the request and carries no provisioning state.
fn created(echoed: Option<ArmResource>, id: &ResourceId, location: &str) -> ResourceSnapshot {
    match echoed {
        Some(resource) => resource.into(),
        None => ResourceSnapshot {
            id: id.to_string(),
            name: id.name().to_string(),
            location: Some(location.to_string()),
            provisioning_state: None,
            properties: serde_json::Value::Null,
        },
    }
}

#[async_trait]
impl ResourceClient for AzureNetAppFiles {
    fn name(&self) -> &str {
        "azure-netapp-files"
    }

    async fn get_account(&self, account: &AccountRef) -> Result<ResourceSnapshot> {
        self.get_snapshot_of(&self.account_path(account)).await
    }

    async fn get_pool(&self, pool: &PoolRef) -> Result<ResourceSnapshot> {
        self.get_snapshot_of(&self.pool_path(pool)).await
    }

    async fn get_volume(&self, volume: &VolumeRef) -> Result<ResourceSnapshot> {
        self.get_snapshot_of(&self.volume_path(volume)).await
    }

    async fn get_snapshot(&self, snapshot: &SnapshotRef) -> Result<ResourceSnapshot> {
        self.get_snapshot_of(&self.snapshot_path(snapshot)).await
    }

    async fn get_replication_status(&self, volume: &VolumeRef) -> Result<ReplicationStatus> {
        let path = format!("{}/replicationStatus", self.volume_path(volume));
        Ok(self.client.get(&path, NETAPP_API_VERSION).await?)
    }

    async fn get_resource_by_id(&self, id: &str, api_version: &str) -> Result<ResourceSnapshot> {
        let resource: ArmResource = self.client.get(id, api_version).await?;
        Ok(resource.into())
    }

    async fn create_account(&self, spec: &AccountSpec) -> Result<ResourceSnapshot> {
        let echoed = self
            .client
            .put(
                "create account",
                &spec.id.to_string(),
                NETAPP_API_VERSION,
                &AccountBody::from(spec),
            )
            .await?;
        Ok(created(echoed, &spec.id, &spec.location))
    }

    async fn create_pool(&self, spec: &PoolSpec) -> Result<ResourceSnapshot> {
        let echoed = self
            .client
            .put(
                "create capacity pool",
                &spec.id.to_string(),
                NETAPP_API_VERSION,
                &PoolBody::from(spec),
            )
            .await?;
        Ok(created(echoed, &spec.id, &spec.location))
    }

    async fn create_volume(&self, spec: &VolumeSpec) -> Result<ResourceSnapshot> {
        let echoed = self
            .client
            .put(
                "create volume",
                &spec.id.to_string(),
                NETAPP_API_VERSION,
                &VolumeBody::from(spec),
            )
            .await?;
        Ok(created(echoed, &spec.id, &spec.location))
    }

    async fn create_snapshot(&self, spec: &SnapshotSpec) -> Result<ResourceSnapshot> {
        let echoed = self
            .client
            .put(
                "create snapshot",
                &spec.id.to_string(),
                NETAPP_API_VERSION,
                &SnapshotBody::from(spec),
            )
            .await?;
        Ok(created(echoed, &spec.id, &spec.location))
    }

    async fn authorize_replication(&self, volume: &VolumeRef, remote_volume_id: &str) -> Result<()> {
        let path = format!("{}/authorizeReplication", self.volume_path(volume));
        let body = AuthorizeReplicationBody {
            remote_volume_resource_id: remote_volume_id.to_string(),
        };
        self.client
            .post("authorize replication", &path, NETAPP_API_VERSION, Some(&body))
            .await?;
        Ok(())
    }

    async fn break_replication(&self, volume: &VolumeRef) -> Result<()> {
        self.action("break replication", volume, "breakReplication")
            .await
    }

    async fn delete_replication(&self, volume: &VolumeRef) -> Result<()> {
        self.action("delete replication", volume, "deleteReplication")
            .await
    }

    async fn delete_snapshot(&self, snapshot: &SnapshotRef) -> Result<()> {
        self.client
            .delete(
                "delete snapshot",
                &self.snapshot_path(snapshot),
                NETAPP_API_VERSION,
            )
            .await?;
        Ok(())
    }

    async fn delete_volume(&self, volume: &VolumeRef) -> Result<()> {
        self.client
            .delete("delete volume", &self.volume_path(volume), NETAPP_API_VERSION)
            .await?;
        Ok(())
    }

    async fn delete_pool(&self, pool: &PoolRef) -> Result<()> {
        self.client
            .delete(
                "delete capacity pool",
                &self.pool_path(pool),
                NETAPP_API_VERSION,
            )
            .await?;
        Ok(())
    }

    async fn delete_account(&self, account: &AccountRef) -> Result<()> {
        self.client
            .delete(
                "delete account",
                &self.account_path(account),
                NETAPP_API_VERSION,
            )
            .await?;
        Ok(())
    }
}
