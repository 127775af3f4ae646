//! Azure provider error types

use netrep_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cloud error: {0}")]
    Cloud(#[from] CloudError),
}

pub type Result<T> = std::result::Result<T, AzureError>;

impl From<AzureError> for CloudError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::Cloud(e) => e,
            AzureError::Json(e) => CloudError::Json(e),
            AzureError::Io(e) => CloudError::Io(e),
            AzureError::Http(e) => CloudError::Http(e.to_string()),
            e @ (AzureError::MissingEnvVar(_) | AzureError::InvalidCredentials(_)) => {
                CloudError::InvalidConfig(e.to_string())
            }
        }
    }
}
