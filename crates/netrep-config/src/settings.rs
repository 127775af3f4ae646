//! Settings file schema
//!
//! Every field has a default, so an empty file (or no file at all) describes
//! the sample topology: a Premium primary site in westus replicating hourly to
//! a Standard secondary site in eastus.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_POOL_SIZE_BYTES: u64 = 4_398_046_511_104;
pub const DEFAULT_VOLUME_SIZE_BYTES: u64 = 107_374_182_400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Overrides the subscription taken from the credentials
    pub subscription_id: Option<String>,
    #[serde(default = "SiteConfig::primary")]
    pub primary: SiteConfig,
    #[serde(default = "SiteConfig::secondary")]
    pub secondary: SiteConfig,
    pub pool_size_bytes: u64,
    pub volume_size_bytes: u64,
    pub protocol_types: Vec<String>,
    pub replication_schedule: String,
    pub tags: BTreeMap<String, String>,
    pub polling: PollingConfig,
    /// Tear everything down at the end of `run`
    pub cleanup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            subscription_id: None,
            primary: SiteConfig::primary(),
            secondary: SiteConfig::secondary(),
            pool_size_bytes: DEFAULT_POOL_SIZE_BYTES,
            volume_size_bytes: DEFAULT_VOLUME_SIZE_BYTES,
            protocol_types: vec!["NFSv3".to_string()],
            replication_schedule: "hourly".to_string(),
            tags: BTreeMap::from([
                ("Author".to_string(), "ANF Go CRR SDK Sample".to_string()),
                ("Service".to_string(), "Azure Netapp Files".to_string()),
            ]),
            polling: PollingConfig::default(),
            cleanup: false,
        }
    }
}

impl Settings {
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document deserializes as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Structural checks that do not need the cloud types
    pub fn validate(&self) -> Result<()> {
        self.primary.validate("primary")?;
        self.secondary.validate("secondary")?;

        if self.primary.resource_group == self.secondary.resource_group
            && self.primary.account == self.secondary.account
        {
            return Err(ConfigError::Invalid(
                "primary and secondary sites must use different accounts".to_string(),
            ));
        }
        if self.protocol_types.is_empty() {
            return Err(ConfigError::Invalid(
                "protocol_types must not be empty".to_string(),
            ));
        }
        if self.pool_size_bytes == 0 || self.volume_size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "pool and volume sizes must be greater than zero".to_string(),
            ));
        }
        if self.volume_size_bytes > self.pool_size_bytes {
            return Err(ConfigError::Invalid(format!(
                "volume size {} exceeds pool size {}",
                self.volume_size_bytes, self.pool_size_bytes
            )));
        }
        Ok(())
    }
}

/// One side of the replication pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub location: String,
    pub resource_group: String,
    /// Resource group of the virtual network, defaults to `resource_group`
    #[serde(default)]
    pub vnet_resource_group: Option<String>,
    pub vnet: String,
    pub subnet: String,
    pub account: String,
    pub pool: String,
    pub service_level: String,
    pub volume: String,
}

impl SiteConfig {
    pub fn primary() -> Self {
        Self {
            location: "westus".to_string(),
            resource_group: "anf-primary-rg".to_string(),
            vnet_resource_group: None,
            vnet: "westus-primary-vnet".to_string(),
            subnet: "anf-primary-sn".to_string(),
            account: "PrimaryANFAccount".to_string(),
            pool: "PrimaryPool".to_string(),
            service_level: "Premium".to_string(),
            volume: "PrimaryVolume".to_string(),
        }
    }

    pub fn secondary() -> Self {
        Self {
            location: "eastus".to_string(),
            resource_group: "anf-secondary-rg".to_string(),
            vnet_resource_group: None,
            vnet: "eastus-secondary-vnet".to_string(),
            subnet: "anf-secondary-sn".to_string(),
            account: "SecondaryANFAccount".to_string(),
            pool: "SecondaryPool".to_string(),
            service_level: "Standard".to_string(),
            volume: "SecondaryVolume".to_string(),
        }
    }

    pub fn vnet_resource_group(&self) -> &str {
        self.vnet_resource_group
            .as_deref()
            .unwrap_or(&self.resource_group)
    }

    /// ARM id of the delegated subnet
    pub fn subnet_id(&self, subscription_id: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/virtualNetworks/{}/subnets/{}",
            subscription_id,
            self.vnet_resource_group(),
            self.vnet,
            self.subnet
        )
    }

    fn validate(&self, site: &str) -> Result<()> {
        let fields = [
            ("location", &self.location),
            ("resource_group", &self.resource_group),
            ("vnet", &self.vnet),
            ("subnet", &self.subnet),
            ("account", &self.account),
            ("pool", &self.pool),
            ("service_level", &self.service_level),
            ("volume", &self.volume),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{}.{} must not be empty",
                    site, name
                )));
            }
        }
        Ok(())
    }
}

/// Interval and attempt count of one kind of wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitConfig {
    pub interval_secs: u64,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// New volumes and the replication link
    pub readiness: WaitConfig,
    /// Deleted resources
    pub deletion: WaitConfig,
    /// Secondary reaching the Mirrored state; skipped when unset
    pub mirror: Option<WaitConfig>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            readiness: WaitConfig {
                interval_secs: 60,
                max_attempts: 50,
            },
            deletion: WaitConfig {
                interval_secs: 60,
                max_attempts: 60,
            },
            mirror: None,
        }
    }
}
