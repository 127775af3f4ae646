//! Azure NetApp Files provider for netrep
//!
//! This crate implements the [`ResourceClient`](netrep_cloud::ResourceClient)
//! trait over the Azure Resource Manager REST API, covering NetApp accounts,
//! capacity pools, volumes, snapshots and cross-region replication.
//!
//! # Requirements
//!
//! - `AZURE_AUTH_LOCATION` (service principal file with `subscriptionId`) or
//!   `AZURE_SUBSCRIPTION_ID`
//! - `AZURE_ACCESS_TOKEN` with a management-plane bearer token
//!
//! # Example
//!
//! ```ignore
//! use netrep_cloud::{Poller, Probe, ResourceId, WaitPolicy};
//! use netrep_cloud_azure::{AzureCredentials, AzureNetAppFiles};
//!
//! let credentials = AzureCredentials::from_env()?;
//! let anf = AzureNetAppFiles::new(&credentials)?;
//!
//! let volume: ResourceId = volume_id.parse()?;
//! Poller::new(&anf)
//!     .poll(&volume, Probe::Existence, &WaitPolicy::presence(interval, 50))
//!     .await?;
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod models;
pub mod provider;

pub use client::ArmClient;
pub use credentials::AzureCredentials;
pub use error::{AzureError, Result};
pub use provider::{AzureNetAppFiles, NETAPP_API_VERSION};
