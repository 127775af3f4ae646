//! Subscription and token discovery
//!
//! The subscription id comes from the service principal file named by
//! `AZURE_AUTH_LOCATION` (the `subscriptionId` field), falling back to
//! `AZURE_SUBSCRIPTION_ID`. The bearer token is taken as-is from
//! `AZURE_ACCESS_TOKEN`, e.g. the output of
//! `az account get-access-token --query accessToken -o tsv`.

use crate::error::{AzureError, Result};
use serde::Deserialize;
use std::path::Path;

pub const AUTH_LOCATION_ENV: &str = "AZURE_AUTH_LOCATION";
pub const SUBSCRIPTION_ENV: &str = "AZURE_SUBSCRIPTION_ID";
pub const ACCESS_TOKEN_ENV: &str = "AZURE_ACCESS_TOKEN";

#[derive(Clone)]
pub struct AzureCredentials {
    pub subscription_id: String,
    pub access_token: String,
}

impl std::fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("subscription_id", &self.subscription_id)
            .field("access_token", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthFile {
    subscription_id: Option<String>,
}

impl AzureCredentials {
    /// Create AzureCredentials from environment variables
    pub fn from_env() -> Result<Self> {
        let subscription_id = match std::env::var(AUTH_LOCATION_ENV) {
            Ok(path) if !path.is_empty() => Self::subscription_from_file(Path::new(&path))?,
            _ => non_empty_var(SUBSCRIPTION_ENV)?,
        };
        let access_token = non_empty_var(ACCESS_TOKEN_ENV)?;

        Ok(Self {
            subscription_id,
            access_token,
        })
    }

    /// Read `subscriptionId` from a service principal auth file
    pub fn subscription_from_file(path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path)?;
        let auth: AuthFile = serde_json::from_str(&content)?;
        auth.subscription_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AzureError::InvalidCredentials(format!(
                    "{} has no subscriptionId",
                    path.display()
                ))
            })
    }
}

fn non_empty_var(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AzureError::MissingEnvVar(name.to_string()))
}
