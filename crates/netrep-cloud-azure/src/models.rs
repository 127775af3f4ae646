//! ARM request and response bodies for Microsoft.NetApp

use netrep_cloud::{
    AccountSpec, DataProtection, PoolSpec, ProtocolType, ResourceSnapshot, ServiceLevel,
    SnapshotSpec, VolumeSpec,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Volume type of a replication destination
pub const DATA_PROTECTION_VOLUME_TYPE: &str = "DataProtection";

/// Clients allowed by the default export policy rule
pub const DEFAULT_ALLOWED_CLIENTS: &str = "0.0.0.0/0";

// ============ Responses ============

/// Any ARM tracked resource
#[derive(Debug, Deserialize)]
pub struct ArmResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub properties: serde_json::Value,
}

impl From<ArmResource> for ResourceSnapshot {
    fn from(r: ArmResource) -> Self {
        let provisioning_state = r
            .properties
            .get("provisioningState")
            .and_then(|s| s.as_str())
            .map(str::to_string);
        ResourceSnapshot {
            id: r.id,
            name: r.name,
            location: r.location,
            provisioning_state,
            properties: r.properties,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ArmErrorResponse {
    pub error: ArmErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArmErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Body returned by an `Azure-AsyncOperation` URL
#[derive(Debug, Deserialize)]
pub struct AsyncOperationStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<ArmErrorDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    InProgress,
    Succeeded,
    Failed,
}

impl AsyncOperationStatus {
    pub fn state(&self) -> OperationState {
        match self.status.to_ascii_lowercase().as_str() {
            "succeeded" => OperationState::Succeeded,
            "failed" | "canceled" | "cancelled" => OperationState::Failed,
            _ => OperationState::InProgress,
        }
    }
}

// ============ Requests ============

#[derive(Debug, Serialize)]
pub struct AccountBody {
    pub location: String,
    pub tags: HashMap<String, String>,
    pub properties: AccountProperties,
}

#[derive(Debug, Default, Serialize)]
pub struct AccountProperties {}

impl From<&AccountSpec> for AccountBody {
    fn from(spec: &AccountSpec) -> Self {
        Self {
            location: spec.location.clone(),
            tags: spec.tags.clone(),
            properties: AccountProperties::default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PoolBody {
    pub location: String,
    pub tags: HashMap<String, String>,
    pub properties: PoolProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolProperties {
    pub service_level: ServiceLevel,
    pub size: u64,
}

impl From<&PoolSpec> for PoolBody {
    fn from(spec: &PoolSpec) -> Self {
        Self {
            location: spec.location.clone(),
            tags: spec.tags.clone(),
            properties: PoolProperties {
                service_level: spec.service_level,
                size: spec.size_bytes,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VolumeBody {
    pub location: String,
    pub tags: HashMap<String, String>,
    pub properties: VolumeProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProperties {
    pub creation_token: String,
    pub service_level: ServiceLevel,
    pub usage_threshold: u64,
    pub subnet_id: String,
    pub protocol_types: Vec<ProtocolType>,
    pub export_policy: ExportPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_protection: Option<VolumeDataProtection>,
}

#[derive(Debug, Serialize)]
pub struct ExportPolicy {
    pub rules: Vec<ExportPolicyRule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPolicyRule {
    pub rule_index: u32,
    pub allowed_clients: String,
    pub unix_read_only: bool,
    pub unix_read_write: bool,
    pub cifs: bool,
    pub nfsv3: bool,
    pub nfsv41: bool,
}

#[derive(Debug, Serialize)]
pub struct VolumeDataProtection {
    pub replication: DataProtection,
}

impl From<&VolumeSpec> for VolumeBody {
    fn from(spec: &VolumeSpec) -> Self {
        let has = |p: ProtocolType| spec.protocol_types.contains(&p);
        let rule = ExportPolicyRule {
            rule_index: 1,
            allowed_clients: DEFAULT_ALLOWED_CLIENTS.to_string(),
            unix_read_only: spec.unix_read_only,
            unix_read_write: spec.unix_read_write,
            cifs: has(ProtocolType::Cifs),
            nfsv3: has(ProtocolType::Nfsv3),
            nfsv41: has(ProtocolType::Nfsv41),
        };

        Self {
            location: spec.location.clone(),
            tags: spec.tags.clone(),
            properties: VolumeProperties {
                creation_token: spec.creation_token().to_string(),
                service_level: spec.service_level,
                usage_threshold: spec.usage_threshold_bytes,
                subnet_id: spec.subnet_id.clone(),
                protocol_types: spec.protocol_types.clone(),
                export_policy: ExportPolicy { rules: vec![rule] },
                snapshot_id: spec.snapshot_id.clone(),
                volume_type: spec
                    .is_data_protection()
                    .then(|| DATA_PROTECTION_VOLUME_TYPE.to_string()),
                data_protection: spec
                    .data_protection
                    .clone()
                    .map(|replication| VolumeDataProtection { replication }),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SnapshotBody {
    pub location: String,
}

impl From<&SnapshotSpec> for SnapshotBody {
    fn from(spec: &SnapshotSpec) -> Self {
        Self {
            location: spec.location.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeReplicationBody {
    pub remote_volume_resource_id: String,
}
