//! Control plane error types

use crate::model::MirrorState;
use thiserror::Error;

/// Error code the service returns when a volume has no replication to delete
pub const REPLICATION_MISSING_CODE: &str = "VolumeReplicationMissing";

/// Control plane errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("{operation} failed: {message}")]
    MutationFailed { operation: String, message: String },

    #[error("Timed out waiting for {resource} after {attempts} attempts{}", last_seen(.last))]
    Timeout {
        resource: String,
        attempts: u32,
        last: Option<String>,
    },

    #[error(
        "Volume {volume} still not at {target} mirror state after {attempts} attempts (last observed: {})",
        mirror_state_or_none(.last_observed)
    )]
    MirrorStateTimeout {
        volume: String,
        target: MirrorState,
        attempts: u32,
        last_observed: Option<MirrorState>,
    },

    #[error("Invalid resource id: {0}")]
    InvalidResourceId(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{site} subnet not found: {subnet}")]
    SubnetNotFound { site: String, subnet: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn last_seen(last: &Option<String>) -> String {
    match last {
        Some(last) => format!(", last observation: {}", last),
        None => String::new(),
    }
}

fn mirror_state_or_none(state: &Option<MirrorState>) -> String {
    state
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl CloudError {
    /// Whether the control plane reported the resource as absent
    pub fn is_not_found(&self) -> bool {
        match self {
            CloudError::NotFound(_) => true,
            CloudError::Api { status, code, .. } => {
                *status == 404 || code == "ResourceNotFound" || code == "NotFound"
            }
            _ => false,
        }
    }

    /// Whether a replication deletion failed only because there was nothing to delete
    pub fn is_replication_missing(&self) -> bool {
        match self {
            CloudError::Api { code, message, .. } => {
                code == REPLICATION_MISSING_CODE || message.contains(REPLICATION_MISSING_CODE)
            }
            CloudError::MutationFailed { message, .. } => {
                message.contains(REPLICATION_MISSING_CODE)
            }
            _ => false,
        }
    }

    pub fn mutation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        CloudError::MutationFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
