//! netrep cloud core
//!
//! This crate provides the provider-neutral core of netrep: resource
//! identities, the [`ResourceClient`] abstraction over a storage control plane,
//! and the logic built on top of it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   netrep CLI                     │
//! │            (netrep run / cleanup)                │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 netrep-cloud                     │
//! │  ┌──────────────────┐  ┌──────────────────┐     │
//! │  │  Replication     │  │  Cleanup         │     │
//! │  │  Orchestrator    │  │  Sequencer       │     │
//! │  └────────┬─────────┘  └────────┬─────────┘     │
//! │  ┌────────▼─────────────────────▼─────────┐     │
//! │  │                Poller                  │     │
//! │  └────────────────────┬───────────────────┘     │
//! │  ┌────────────────────▼───────────────────┐     │
//! │  │      trait ResourceClient { ... }      │     │
//! │  └────────────────────────────────────────┘     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼────────┐
//!           │  azure netapp  │
//!           │     files      │
//!           └────────────────┘
//! ```

pub mod cleanup;
pub mod error;
pub mod model;
pub mod poller;
pub mod provider;
pub mod replication;
pub mod report;
pub mod resource;

// Re-exports
pub use cleanup::{CleanupSequencer, DELETION_BUDGET, SiteTeardown};
pub use error::{CloudError, Result};
pub use model::{
    AccountSpec, DataProtection, EndpointType, MirrorState, PoolSpec, ProtocolType,
    RelationshipStatus, ReplicationSchedule, ReplicationStatus, ResourceSnapshot, ResourceState,
    ServiceLevel, SnapshotSpec, VolumeSpec,
};
pub use poller::{PollOutcome, Poller, Probe, WaitBudget, WaitMode, WaitPolicy};
pub use provider::ResourceClient;
pub use replication::{
    NETWORK_API_VERSION, READINESS_BUDGET, ReplicationOrchestrator, ReplicationPlan, SitePlan,
};
pub use report::{CleanupReport, RunReport, Site, SiteProgress, SiteStage, StepResult};
pub use resource::{
    AccountRef, NETAPP_PROVIDER, PoolRef, ResourceId, ResourceLevel, ResourceTarget, SnapshotRef,
    VolumeRef,
};
