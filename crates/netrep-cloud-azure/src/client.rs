//! Azure Resource Manager REST client
//!
//! Thin wrapper over `reqwest` with bearer authentication, ARM error mapping
//! and long-running operation handling. A mutation resolves once its
//! operation has completed on the service side.

use crate::credentials::AzureCredentials;
use crate::error::Result;
use crate::models::{ArmErrorResponse, AsyncOperationStatus, OperationState};
use netrep_cloud::CloudError;
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::time::sleep;

pub const ARM_ENDPOINT: &str = "https://management.azure.com";
pub const USER_AGENT: &str = "netrep-anf-sample";

const ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(10);
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

pub struct ArmClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    operation_timeout: Duration,
}

impl ArmClient {
    pub fn new(credentials: &AzureCredentials) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: ARM_ENDPOINT.to_string(),
            access_token: credentials.access_token.clone(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        })
    }

    /// Point the client at another ARM endpoint (sovereign clouds)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Upper bound on how long a single long-running operation is followed
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn url(&self, path: &str, api_version: &str) -> String {
        format!("{}{}?api-version={}", self.base_url, path, api_version)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    /// GET a resource and decode its body
    pub async fn get<T: DeserializeOwned>(&self, path: &str, api_version: &str) -> Result<T> {
        let url = self.url(path, api_version);
        tracing::debug!("GET {}", url);
        let response = self.request(Method::GET, &url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// PUT a resource body and wait for provisioning to finish
    ///
    /// Returns the resource representation from the PUT response when the
    /// service sent one. Readiness is not checked here.
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        api_version: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let url = self.url(path, api_version);
        tracing::debug!("PUT {}", url);
        let response = self.request(Method::PUT, &url).json(body).send().await?;
        let response = check_status(response).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let echoed = response.bytes().await?;
        self.complete(operation, status, &headers).await?;
        Ok(serde_json::from_slice(&echoed).ok())
    }

    /// POST an action, optionally with a body, and wait for it to finish
    pub async fn post<B: Serialize>(
        &self,
        operation: &str,
        path: &str,
        api_version: &str,
        body: Option<&B>,
    ) -> Result<()> {
        let url = self.url(path, api_version);
        tracing::debug!("POST {}", url);
        let mut request = self.request(Method::POST, &url);
        request = match body {
            Some(body) => request.json(body),
            None => request.header(reqwest::header::CONTENT_LENGTH, 0),
        };
        let response = check_status(request.send().await?).await?;
        self.complete(operation, response.status(), response.headers())
            .await
    }

    /// DELETE a resource and wait for the deletion to finish
    pub async fn delete(&self, operation: &str, path: &str, api_version: &str) -> Result<()> {
        let url = self.url(path, api_version);
        tracing::debug!("DELETE {}", url);
        let response = self.request(Method::DELETE, &url).send().await?;
        let response = check_status(response).await?;
        self.complete(operation, response.status(), response.headers())
            .await
    }

    /// Follow a long-running operation to its end
    async fn complete(
        &self,
        operation: &str,
        status: StatusCode,
        headers: &HeaderMap,
    ) -> Result<()> {
        if status != StatusCode::CREATED && status != StatusCode::ACCEPTED {
            return Ok(());
        }

        let delay = retry_after(headers);
        if let Some(url) = header_value(headers, ASYNC_OPERATION_HEADER) {
            self.follow_async_operation(operation, &url, delay).await
        } else if let Some(url) = header_value(headers, LOCATION.as_str()) {
            self.follow_location(operation, &url, delay).await
        } else {
            Ok(())
        }
    }

    async fn follow_async_operation(
        &self,
        operation: &str,
        url: &str,
        mut delay: Duration,
    ) -> Result<()> {
        let deadline = Instant::now() + self.operation_timeout;
        loop {
            if Instant::now() >= deadline {
                return Err(operation_timed_out(operation).into());
            }
            sleep(delay).await;

            let response = check_status(self.request(Method::GET, url).send().await?).await?;
            delay = retry_after(response.headers());
            let op: AsyncOperationStatus = response.json().await?;
            tracing::debug!("{}: operation status {}", operation, op.status);

            match op.state() {
                OperationState::InProgress => continue,
                OperationState::Succeeded => return Ok(()),
                OperationState::Failed => {
                    let message = match op.error {
                        Some(e) => format!("Code=\"{}\" Message=\"{}\"", e.code, e.message),
                        None => format!("operation ended with status {}", op.status),
                    };
                    return Err(CloudError::mutation(operation, message).into());
                }
            }
        }
    }

    async fn follow_location(&self, operation: &str, url: &str, mut delay: Duration) -> Result<()> {
        let deadline = Instant::now() + self.operation_timeout;
        loop {
            if Instant::now() >= deadline {
                return Err(operation_timed_out(operation).into());
            }
            sleep(delay).await;

            let response = self.request(Method::GET, url).send().await?;
            match response.status() {
                StatusCode::ACCEPTED => {
                    delay = retry_after(response.headers());
                    tracing::debug!("{}: operation still running", operation);
                }
                s if s.is_success() => return Ok(()),
                _ => {
                    let err = error_from_response(response).await;
                    return Err(CloudError::mutation(operation, err.to_string()).into());
                }
            }
        }
    }
}

fn operation_timed_out(operation: &str) -> CloudError {
    CloudError::mutation(operation, "long-running operation did not complete in time")
}

async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await.into())
    }
}

async fn error_from_response(response: Response) -> CloudError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    error_from_body(status, &body)
}

/// Map a non-2xx ARM response to a [`CloudError`]
pub fn error_from_body(status: u16, body: &str) -> CloudError {
    let detail = serde_json::from_str::<ArmErrorResponse>(body)
        .ok()
        .map(|r| r.error);
    let (code, message) = match detail {
        Some(d) => (d.code, d.message),
        None => (String::new(), body.trim().to_string()),
    };

    if status == 404 || code == "ResourceNotFound" || code == "NotFound" {
        let message = if message.is_empty() {
            "resource not found".to_string()
        } else {
            message
        };
        return CloudError::NotFound(message);
    }

    CloudError::Api {
        status,
        code,
        message,
    }
}

/// Delay requested by the service, in whole seconds
pub fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
