use async_trait::async_trait;
use netrep_cloud::{
    AccountRef, AccountSpec, CloudError, MirrorState, PoolRef, PoolSpec, ProtocolType,
    ReplicationPlan, ReplicationSchedule, ReplicationStatus, ResourceClient, ResourceId,
    ResourceSnapshot, Result, ServiceLevel, Site, SitePlan, SnapshotRef, SnapshotSpec, VolumeRef,
    VolumeSpec, WaitBudget,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Scripted reply for one call
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Reply {
    Ok,
    NotFound,
    Throttled,
    ReplicationMissing,
    Mirror(MirrorState),
}

impl Reply {
    fn into_error(self, key: &str) -> Option<CloudError> {
        match self {
            Reply::Ok | Reply::Mirror(_) => None,
            Reply::NotFound => Some(CloudError::NotFound(key.to_string())),
            Reply::Throttled => Some(CloudError::Api {
                status: 429,
                code: "TooManyRequests".to_string(),
                message: "throttled".to_string(),
            }),
            Reply::ReplicationMissing => Some(CloudError::Api {
                status: 400,
                code: "VolumeReplicationMissing".to_string(),
                message: "no replication".to_string(),
            }),
        }
    }
}

/// In-memory control plane
///
/// Calls are recorded as `"<method> <name>"`. Scripted replies are consumed in
/// order and the last one repeats. Unscripted observations answer from the
/// mock's own view: present unless deleted.
#[derive(Default)]
pub struct MockClient {
    calls: Mutex<Vec<String>>,
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    deleted: Mutex<HashSet<String>>,
    cancel_on: Mutex<Option<(String, CancellationToken)>>,
}

#[allow(dead_code)]
impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, key: &str, replies: Vec<Reply>) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(key.to_string(), replies.into());
        self
    }

    /// Fire `token` as soon as `key` is called, like a ctrl-c mid-request
    pub fn cancel_on(&self, key: &str, token: CancellationToken) -> &Self {
        *self.cancel_on.lock().unwrap() = Some((key.to_string(), token));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, key: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == key).count()
    }

    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("get_"))
            .collect()
    }

    fn record(&self, key: &str) -> Option<Reply> {
        self.calls.lock().unwrap().push(key.to_string());
        if let Some((trigger, token)) = self.cancel_on.lock().unwrap().as_ref() {
            if trigger == key {
                token.cancel();
            }
        }
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    fn observe(&self, key: &str, name: &str) -> Result<ResourceSnapshot> {
        match self.record(key) {
            Some(reply) => match reply.into_error(key) {
                Some(e) => Err(e),
                None => Ok(snapshot(name)),
            },
            None if self.deleted.lock().unwrap().contains(key) => {
                Err(CloudError::NotFound(key.to_string()))
            }
            None => Ok(snapshot(name)),
        }
    }

    fn mutate(&self, key: &str, observed_key: Option<String>) -> Result<()> {
        if let Some(e) = self.record(key).and_then(|r| r.into_error(key)) {
            return Err(e);
        }
        if let Some(observed_key) = observed_key {
            self.deleted.lock().unwrap().insert(observed_key);
        }
        Ok(())
    }
}

fn snapshot(name: &str) -> ResourceSnapshot {
    ResourceSnapshot {
        id: name.to_string(),
        name: name.to_string(),
        location: Some("westus".to_string()),
        provisioning_state: Some("Succeeded".to_string()),
        properties: serde_json::Value::Null,
    }
}

#[async_trait]
impl ResourceClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_account(&self, account: &AccountRef) -> Result<ResourceSnapshot> {
        let key = format!("get_account {}", account.account);
        self.observe(&key, &account.account)
    }

    async fn get_pool(&self, pool: &PoolRef) -> Result<ResourceSnapshot> {
        let key = format!("get_pool {}", pool.pool);
        self.observe(&key, &pool.pool)
    }

    async fn get_volume(&self, volume: &VolumeRef) -> Result<ResourceSnapshot> {
        let key = format!("get_volume {}", volume.volume);
        self.observe(&key, &volume.volume)
    }

    async fn get_snapshot(&self, snapshot: &SnapshotRef) -> Result<ResourceSnapshot> {
        let key = format!("get_snapshot {}", snapshot.snapshot);
        self.observe(&key, &snapshot.snapshot)
    }

    async fn get_replication_status(&self, volume: &VolumeRef) -> Result<ReplicationStatus> {
        let key = format!("get_replication_status {}", volume.volume);
        let missing = || CloudError::Api {
            status: 400,
            code: "VolumeReplicationMissing".to_string(),
            message: "no replication".to_string(),
        };
        match self.record(&key) {
            Some(Reply::Mirror(state)) => Ok(ReplicationStatus {
                healthy: Some(true),
                mirror_state: Some(state),
                ..Default::default()
            }),
            Some(reply) => match reply.into_error(&key) {
                Some(e) => Err(e),
                None => Ok(ReplicationStatus::default()),
            },
            None if self.deleted.lock().unwrap().contains(&key) => Err(missing()),
            None => Ok(ReplicationStatus::default()),
        }
    }

    async fn get_resource_by_id(&self, id: &str, _api_version: &str) -> Result<ResourceSnapshot> {
        let key = format!("get_resource_by_id {}", id);
        self.observe(&key, id)
    }

    async fn create_account(&self, spec: &AccountSpec) -> Result<ResourceSnapshot> {
        let name = spec.id.name().to_string();
        self.mutate(&format!("create_account {}", name), None)?;
        Ok(snapshot(&name))
    }

    async fn create_pool(&self, spec: &PoolSpec) -> Result<ResourceSnapshot> {
        let name = spec.id.name().to_string();
        self.mutate(&format!("create_pool {}", name), None)?;
        Ok(snapshot(&name))
    }

    async fn create_volume(&self, spec: &VolumeSpec) -> Result<ResourceSnapshot> {
        let name = spec.id.name().to_string();
        let kind = if spec.is_data_protection() {
            "create_volume(dp)"
        } else {
            "create_volume"
        };
        self.mutate(&format!("{} {}", kind, name), None)?;
        Ok(snapshot(&name))
    }

    async fn create_snapshot(&self, spec: &SnapshotSpec) -> Result<ResourceSnapshot> {
        let name = spec.id.name().to_string();
        self.mutate(&format!("create_snapshot {}", name), None)?;
        Ok(snapshot(&name))
    }

    async fn authorize_replication(&self, volume: &VolumeRef, _remote_volume_id: &str) -> Result<()> {
        self.mutate(&format!("authorize_replication {}", volume.volume), None)
    }

    async fn break_replication(&self, volume: &VolumeRef) -> Result<()> {
        self.mutate(&format!("break_replication {}", volume.volume), None)
    }

    async fn delete_replication(&self, volume: &VolumeRef) -> Result<()> {
        self.mutate(
            &format!("delete_replication {}", volume.volume),
            Some(format!("get_replication_status {}", volume.volume)),
        )
    }

    async fn delete_snapshot(&self, snapshot: &SnapshotRef) -> Result<()> {
        self.mutate(
            &format!("delete_snapshot {}", snapshot.snapshot),
            Some(format!("get_snapshot {}", snapshot.snapshot)),
        )
    }

    async fn delete_volume(&self, volume: &VolumeRef) -> Result<()> {
        self.mutate(
            &format!("delete_volume {}", volume.volume),
            Some(format!("get_volume {}", volume.volume)),
        )
    }

    async fn delete_pool(&self, pool: &PoolRef) -> Result<()> {
        self.mutate(
            &format!("delete_pool {}", pool.pool),
            Some(format!("get_pool {}", pool.pool)),
        )
    }

    async fn delete_account(&self, account: &AccountRef) -> Result<()> {
        self.mutate(
            &format!("delete_account {}", account.account),
            Some(format!("get_account {}", account.account)),
        )
    }
}

pub const PRIMARY_SUBNET: &str = "/subscriptions/sub/resourceGroups/anf-primary-rg/providers/Microsoft.Network/virtualNetworks/westus-primary-vnet/subnets/anf-primary-sn";
pub const SECONDARY_SUBNET: &str = "/subscriptions/sub/resourceGroups/anf-secondary-rg/providers/Microsoft.Network/virtualNetworks/eastus-secondary-vnet/subnets/anf-secondary-sn";

/// Sample plan with zero intervals
#[allow(dead_code)]
pub fn sample_plan() -> ReplicationPlan {
    let budget = WaitBudget::new(Duration::ZERO, 3);
    ReplicationPlan {
        primary: SitePlan::new(
            Site::Primary,
            "westus",
            PRIMARY_SUBNET,
            ServiceLevel::Premium,
            ResourceId::account("sub", "anf-primary-rg", "PrimaryANFAccount"),
            "PrimaryPool",
            "PrimaryVolume",
        )
        .unwrap(),
        secondary: SitePlan::new(
            Site::Secondary,
            "eastus",
            SECONDARY_SUBNET,
            ServiceLevel::Standard,
            ResourceId::account("sub", "anf-secondary-rg", "SecondaryANFAccount"),
            "SecondaryPool",
            "SecondaryVolume",
        )
        .unwrap(),
        pool_size_bytes: 4_398_046_511_104,
        volume_size_bytes: 107_374_182_400,
        protocol_types: vec![ProtocolType::Nfsv3],
        schedule: ReplicationSchedule::Hourly,
        tags: HashMap::new(),
        readiness: budget,
        mirror: None,
    }
}
