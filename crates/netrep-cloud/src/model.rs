//! Domain data passed through the core
//!
//! The poller treats these values opaquely; only the mirror-state wait looks
//! inside a [`ReplicationStatus`].

use crate::error::CloudError;
use crate::resource::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Observed state of a remote resource
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState {
    Resource(ResourceSnapshot),
    Replication(ReplicationStatus),
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceState::Resource(r) => write!(
                f,
                "{} (provisioning state: {})",
                r.name,
                r.provisioning_state.as_deref().unwrap_or("unknown")
            ),
            ResourceState::Replication(r) => write!(
                f,
                "replication mirror state {}, relationship {}",
                r.mirror_state
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                r.relationship_status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
        }
    }
}

/// Snapshot of a resource as returned by a GET
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub provisioning_state: Option<String>,
    /// Remaining provider-specific properties
    #[serde(default)]
    pub properties: serde_json::Value,
}

impl ResourceSnapshot {
    pub fn is_succeeded(&self) -> bool {
        self.provisioning_state
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("Succeeded"))
    }
}

/// Replication status of a volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationStatus {
    pub healthy: Option<bool>,
    pub relationship_status: Option<RelationshipStatus>,
    pub mirror_state: Option<MirrorState>,
    pub total_progress: Option<String>,
    pub error_message: Option<String>,
}

/// Mirror state of a replication relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorState {
    Uninitialized,
    Mirrored,
    Broken,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for MirrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorState::Uninitialized => write!(f, "Uninitialized"),
            MirrorState::Mirrored => write!(f, "Mirrored"),
            MirrorState::Broken => write!(f, "Broken"),
            MirrorState::Unknown => write!(f, "Unknown"),
        }
    }
}

impl FromStr for MirrorState {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uninitialized" => Ok(MirrorState::Uninitialized),
            "mirrored" => Ok(MirrorState::Mirrored),
            "broken" => Ok(MirrorState::Broken),
            _ => Err(CloudError::InvalidConfig(format!(
                "invalid mirror state '{}', expected one of: Uninitialized, Mirrored, Broken",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipStatus {
    Idle,
    Transferring,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipStatus::Idle => write!(f, "Idle"),
            RelationshipStatus::Transferring => write!(f, "Transferring"),
            RelationshipStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Capacity pool / volume service level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceLevel {
    Standard,
    Premium,
    Ultra,
}

impl FromStr for ServiceLevel {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(ServiceLevel::Standard),
            "premium" => Ok(ServiceLevel::Premium),
            "ultra" => Ok(ServiceLevel::Ultra),
            _ => Err(CloudError::InvalidConfig(format!(
                "invalid service level '{}', supported service levels are: Standard, Premium, Ultra",
                s
            ))),
        }
    }
}

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceLevel::Standard => write!(f, "Standard"),
            ServiceLevel::Premium => write!(f, "Premium"),
            ServiceLevel::Ultra => write!(f, "Ultra"),
        }
    }
}

/// File protocol exposed by a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolType {
    #[serde(rename = "NFSv3")]
    Nfsv3,
    #[serde(rename = "NFSv4.1")]
    Nfsv41,
    #[serde(rename = "CIFS")]
    Cifs,
}

impl FromStr for ProtocolType {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nfsv3" => Ok(ProtocolType::Nfsv3),
            "nfsv4.1" => Ok(ProtocolType::Nfsv41),
            "cifs" => Ok(ProtocolType::Cifs),
            _ => Err(CloudError::InvalidConfig(format!(
                "invalid protocol type '{}', valid protocol types are: NFSv3, NFSv4.1, CIFS",
                s
            ))),
        }
    }
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolType::Nfsv3 => write!(f, "NFSv3"),
            ProtocolType::Nfsv41 => write!(f, "NFSv4.1"),
            ProtocolType::Cifs => write!(f, "CIFS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReplicationSchedule {
    #[serde(rename = "_10minutely")]
    TenMinutely,
    #[default]
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
}

impl FromStr for ReplicationSchedule {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "_10minutely" | "10minutely" => Ok(ReplicationSchedule::TenMinutely),
            "hourly" => Ok(ReplicationSchedule::Hourly),
            "daily" => Ok(ReplicationSchedule::Daily),
            _ => Err(CloudError::InvalidConfig(format!(
                "invalid replication schedule '{}', expected one of: _10minutely, hourly, daily",
                s
            ))),
        }
    }
}

impl fmt::Display for ReplicationSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicationSchedule::TenMinutely => write!(f, "_10minutely"),
            ReplicationSchedule::Hourly => write!(f, "hourly"),
            ReplicationSchedule::Daily => write!(f, "daily"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointType {
    #[serde(rename = "src")]
    Source,
    #[serde(rename = "dst")]
    Destination,
}

/// Replication settings of a data protection (destination) volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProtection {
    pub endpoint_type: EndpointType,
    pub remote_volume_region: String,
    pub remote_volume_resource_id: String,
    pub replication_schedule: ReplicationSchedule,
}

impl DataProtection {
    /// Destination-side replication pointing at `source`
    pub fn destination_of(
        source: &ResourceId,
        source_region: impl Into<String>,
        schedule: ReplicationSchedule,
    ) -> Self {
        Self {
            endpoint_type: EndpointType::Destination,
            remote_volume_region: source_region.into(),
            remote_volume_resource_id: source.to_string(),
            replication_schedule: schedule,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccountSpec {
    pub id: ResourceId,
    pub location: String,
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct PoolSpec {
    pub id: ResourceId,
    pub location: String,
    pub service_level: ServiceLevel,
    pub size_bytes: u64,
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct VolumeSpec {
    pub id: ResourceId,
    pub location: String,
    pub service_level: ServiceLevel,
    pub subnet_id: String,
    pub protocol_types: Vec<ProtocolType>,
    pub usage_threshold_bytes: u64,
    pub unix_read_only: bool,
    pub unix_read_write: bool,
    pub snapshot_id: Option<String>,
    pub data_protection: Option<DataProtection>,
    pub tags: HashMap<String, String>,
}

impl VolumeSpec {
    /// Creation token defaults to the volume name
    pub fn creation_token(&self) -> &str {
        self.id.name()
    }

    pub fn is_data_protection(&self) -> bool {
        self.data_protection.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotSpec {
    pub id: ResourceId,
    pub location: String,
}
