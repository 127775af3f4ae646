//! Resource operation client trait definition

use crate::error::Result;
use crate::model::{
    AccountSpec, PoolSpec, ReplicationStatus, ResourceSnapshot, SnapshotSpec, VolumeSpec,
};
use crate::resource::{AccountRef, PoolRef, SnapshotRef, VolumeRef};
use async_trait::async_trait;

/// Control plane client abstraction
///
/// Observation calls return the current state or an error; a not-found
/// error (see [`CloudError::is_not_found`](crate::CloudError::is_not_found))
/// is the signal that the resource is absent.
///
/// Mutation calls start a long-running operation and resolve once it has
/// completed. Awaiting the returned future is awaiting the operation handle.
/// Creates do not read the resource back; readiness is for the poller to
/// observe.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Returns the provider name (e.g., "azure-netapp-files")
    fn name(&self) -> &str;

    // Observations

    async fn get_account(&self, account: &AccountRef) -> Result<ResourceSnapshot>;

    async fn get_pool(&self, pool: &PoolRef) -> Result<ResourceSnapshot>;

    async fn get_volume(&self, volume: &VolumeRef) -> Result<ResourceSnapshot>;

    async fn get_snapshot(&self, snapshot: &SnapshotRef) -> Result<ResourceSnapshot>;

    async fn get_replication_status(&self, volume: &VolumeRef) -> Result<ReplicationStatus>;

    /// Generic lookup of any resource by its full id (used for subnets)
    async fn get_resource_by_id(&self, id: &str, api_version: &str) -> Result<ResourceSnapshot>;

    // Mutations

    async fn create_account(&self, spec: &AccountSpec) -> Result<ResourceSnapshot>;

    async fn create_pool(&self, spec: &PoolSpec) -> Result<ResourceSnapshot>;

    async fn create_volume(&self, spec: &VolumeSpec) -> Result<ResourceSnapshot>;

    async fn create_snapshot(&self, spec: &SnapshotSpec) -> Result<ResourceSnapshot>;

    /// Authorize replication from `volume` (source) to `remote_volume_id` (destination)
    async fn authorize_replication(&self, volume: &VolumeRef, remote_volume_id: &str)
    -> Result<()>;

    async fn break_replication(&self, volume: &VolumeRef) -> Result<()>;

    async fn delete_replication(&self, volume: &VolumeRef) -> Result<()>;

    async fn delete_snapshot(&self, snapshot: &SnapshotRef) -> Result<()>;

    async fn delete_volume(&self, volume: &VolumeRef) -> Result<()>;

    async fn delete_pool(&self, pool: &PoolRef) -> Result<()>;

    async fn delete_account(&self, account: &AccountRef) -> Result<()>;
}
