//! Resource identities within the NetApp account hierarchy
//!
//! An identity is parsed once from its ARM id string and then resolved into a
//! [`ResourceTarget`], a closed set of variants carrying exactly the ancestor
//! names each hierarchy level needs.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NETAPP_PROVIDER: &str = "Microsoft.NetApp";

/// Level of a resource in the account → pool → volume → snapshot hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceLevel {
    Account,
    Pool,
    Volume,
    Snapshot,
}

impl fmt::Display for ResourceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLevel::Account => write!(f, "account"),
            ResourceLevel::Pool => write!(f, "capacity pool"),
            ResourceLevel::Volume => write!(f, "volume"),
            ResourceLevel::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// Parsed identity of a NetApp resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    subscription: String,
    resource_group: String,
    account: String,
    pool: Option<String>,
    volume: Option<String>,
    snapshot: Option<String>,
}

impl ResourceId {
    pub fn account(
        subscription: impl Into<String>,
        resource_group: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            subscription: subscription.into(),
            resource_group: resource_group.into(),
            account: account.into(),
            pool: None,
            volume: None,
            snapshot: None,
        }
    }

    pub fn pool(&self, pool: impl Into<String>) -> Self {
        Self {
            pool: Some(pool.into()),
            volume: None,
            snapshot: None,
            ..self.clone()
        }
    }

    /// Child volume id, only valid on a pool id
    pub fn volume(&self, volume: impl Into<String>) -> Result<Self> {
        self.ensure_parent_of(ResourceLevel::Pool, ResourceLevel::Volume)?;
        Ok(Self {
            volume: Some(volume.into()),
            snapshot: None,
            ..self.clone()
        })
    }

    /// Child snapshot id, only valid on a volume id
    pub fn snapshot(&self, snapshot: impl Into<String>) -> Result<Self> {
        self.ensure_parent_of(ResourceLevel::Volume, ResourceLevel::Snapshot)?;
        Ok(Self {
            snapshot: Some(snapshot.into()),
            ..self.clone()
        })
    }

    fn ensure_parent_of(&self, parent: ResourceLevel, child: ResourceLevel) -> Result<()> {
        if self.level() == parent {
            return Ok(());
        }
        Err(CloudError::InvalidResourceId(format!(
            "{} is a {}, a {} belongs under a {}",
            self,
            self.level(),
            child,
            parent
        )))
    }

    pub fn level(&self) -> ResourceLevel {
        match (&self.pool, &self.volume, &self.snapshot) {
            (Some(_), Some(_), Some(_)) => ResourceLevel::Snapshot,
            (Some(_), Some(_), None) => ResourceLevel::Volume,
            (Some(_), None, _) => ResourceLevel::Pool,
            (None, _, _) => ResourceLevel::Account,
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    pub fn account_name(&self) -> &str {
        &self.account
    }

    pub fn pool_name(&self) -> Option<&str> {
        self.pool.as_deref()
    }

    pub fn volume_name(&self) -> Option<&str> {
        self.volume.as_deref()
    }

    pub fn snapshot_name(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Name of the resource itself (the deepest segment)
    pub fn name(&self) -> &str {
        self.snapshot
            .as_deref()
            .or(self.volume.as_deref())
            .or(self.pool.as_deref())
            .unwrap_or(&self.account)
    }

    /// Identity of the enclosing resource, `None` for accounts
    pub fn parent(&self) -> Option<ResourceId> {
        let mut parent = self.clone();
        match self.level() {
            ResourceLevel::Account => return None,
            ResourceLevel::Pool => parent.pool = None,
            ResourceLevel::Volume => parent.volume = None,
            ResourceLevel::Snapshot => parent.snapshot = None,
        }
        Some(parent)
    }

    /// Resolve the identity into its hierarchy variant
    pub fn target(&self) -> ResourceTarget {
        let account = AccountRef {
            resource_group: self.resource_group.clone(),
            account: self.account.clone(),
        };
        let Some(pool) = self.pool.clone() else {
            return ResourceTarget::Account(account);
        };
        let pool = PoolRef { account, pool };
        let Some(volume) = self.volume.clone() else {
            return ResourceTarget::Pool(pool);
        };
        let volume = VolumeRef { pool, volume };
        match self.snapshot.clone() {
            Some(snapshot) => ResourceTarget::Snapshot(SnapshotRef { volume, snapshot }),
            None => ResourceTarget::Volume(volume),
        }
    }

    /// Volume reference, failing for any other level
    pub fn volume_ref(&self) -> Result<VolumeRef> {
        match self.target() {
            ResourceTarget::Volume(volume) => Ok(volume),
            _ => Err(CloudError::InvalidResourceId(format!(
                "{} is a {}, expected a volume",
                self,
                self.level()
            ))),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/netAppAccounts/{}",
            self.subscription, self.resource_group, NETAPP_PROVIDER, self.account
        )?;
        if let Some(pool) = &self.pool {
            write!(f, "/capacityPools/{}", pool)?;
        }
        if let Some(volume) = &self.volume {
            write!(f, "/volumes/{}", volume)?;
        }
        if let Some(snapshot) = &self.snapshot {
            write!(f, "/snapshots/{}", snapshot)?;
        }
        Ok(())
    }
}

impl FromStr for ResourceId {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| CloudError::InvalidResourceId(format!("{}: {}", s, reason));

        let segments: Vec<&str> = s.trim_matches('/').split('/').collect();
        if segments.len() % 2 != 0 {
            return Err(invalid("expected key/value segment pairs"));
        }

        let mut subscription = None;
        let mut resource_group = None;
        let mut provider = None;
        let mut account = None;
        let mut pool = None;
        let mut volume = None;
        let mut snapshot = None;

        // Keys must appear in hierarchy order
        let mut depth = 0;
        for pair in segments.chunks(2) {
            let (key, value) = (pair[0].to_ascii_lowercase(), pair[1]);
            if value.is_empty() {
                return Err(invalid(&format!("empty value for '{}'", pair[0])));
            }
            let (slot, expected_depth) = match key.as_str() {
                "subscriptions" => (&mut subscription, 0),
                "resourcegroups" => (&mut resource_group, 1),
                "providers" => (&mut provider, 2),
                "netappaccounts" => (&mut account, 3),
                "capacitypools" => (&mut pool, 4),
                "volumes" => (&mut volume, 5),
                "snapshots" => (&mut snapshot, 6),
                _ => return Err(invalid(&format!("unexpected segment '{}'", pair[0]))),
            };
            if expected_depth != depth {
                return Err(invalid(&format!("segment '{}' out of order", pair[0])));
            }
            *slot = Some(value.to_string());
            depth += 1;
        }

        match provider.as_deref() {
            Some(p) if p.eq_ignore_ascii_case(NETAPP_PROVIDER) => {}
            Some(p) => return Err(invalid(&format!("unsupported provider '{}'", p))),
            None => return Err(invalid("missing provider")),
        }

        Ok(ResourceId {
            subscription: subscription.ok_or_else(|| invalid("missing subscription"))?,
            resource_group: resource_group.ok_or_else(|| invalid("missing resource group"))?,
            account: account.ok_or_else(|| invalid("missing account"))?,
            pool,
            volume,
            snapshot,
        })
    }
}

impl Serialize for ResourceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
    pub resource_group: String,
    pub account: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRef {
    pub account: AccountRef,
    pub pool: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeRef {
    pub pool: PoolRef,
    pub volume: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRef {
    pub volume: VolumeRef,
    pub snapshot: String,
}

/// A resource identity resolved to its hierarchy level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceTarget {
    Account(AccountRef),
    Pool(PoolRef),
    Volume(VolumeRef),
    Snapshot(SnapshotRef),
}

impl ResourceTarget {
    pub fn level(&self) -> ResourceLevel {
        match self {
            ResourceTarget::Account(_) => ResourceLevel::Account,
            ResourceTarget::Pool(_) => ResourceLevel::Pool,
            ResourceTarget::Volume(_) => ResourceLevel::Volume,
            ResourceTarget::Snapshot(_) => ResourceLevel::Snapshot,
        }
    }
}
