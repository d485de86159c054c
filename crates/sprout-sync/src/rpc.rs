//! HTTP clients for the attempt-submission and content endpoints.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{QueuedAttempt, VersionStamp};
use crate::queue::{AttemptClient, SubmitError};
use crate::util::{compact_text, normalize_text_option};

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Invalid endpoint configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
}

pub type RpcResult<T> = Result<T, RpcError>;

/// Full or incremental content payload for one domain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentPayload<T> {
    pub items: Vec<T>,
    pub version: u64,
    pub checksum: String,
}

/// HTTP client for the Sprout sync endpoints.
///
/// Covers the version/checksum oracle, the full and delta content fetches,
/// and (through [`AttemptClient`]) attempt submission.
#[derive(Clone)]
pub struct SyncRpcClient {
    endpoint: String,
    client: reqwest::Client,
}

impl SyncRpcClient {
    pub fn new(endpoint: impl Into<String>) -> RpcResult<Self> {
        let endpoint = normalize_endpoint(endpoint.into())?;
        Ok(Self {
            endpoint,
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Fetch the server's current version/checksum stamp for a domain
    pub async fn fetch_stamp(&self, domain: &str) -> RpcResult<VersionStamp> {
        let url = format!("{}/content/{domain}/stamp", self.endpoint);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json::<VersionStamp>().await?)
    }

    /// Fetch the complete payload for a domain
    pub async fn fetch_full<T: DeserializeOwned>(
        &self,
        domain: &str,
    ) -> RpcResult<ContentPayload<T>> {
        let url = format!("{}/content/{domain}", self.endpoint);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json::<ContentPayload<T>>().await?)
    }

    /// Fetch the incremental payload for a domain since a cached version
    pub async fn fetch_delta<T: DeserializeOwned>(
        &self,
        domain: &str,
        since_version: u64,
    ) -> RpcResult<ContentPayload<T>> {
        let url = format!(
            "{}/content/{domain}/delta?since={since_version}",
            self.endpoint
        );
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json::<ContentPayload<T>>().await?)
    }
}

#[derive(Debug, Serialize)]
struct SubmitAttemptRequest<'a> {
    id: String,
    level_id: &'a str,
    difficulty: &'a str,
    score: u32,
}

#[async_trait]
impl AttemptClient for SyncRpcClient {
    /// Submit one attempt, classifying the failure for the drainer.
    ///
    /// Transport-level send failures are retryable; any non-success HTTP
    /// status is a terminal rejection. The stable attempt id rides along so
    /// the server can deduplicate a retried submission that actually landed.
    async fn submit(
        &self,
        credential_token: &str,
        attempt: &QueuedAttempt,
    ) -> Result<(), SubmitError> {
        let request = SubmitAttemptRequest {
            id: attempt.id.as_str(),
            level_id: &attempt.level_id,
            difficulty: &attempt.difficulty,
            score: attempt.score,
        };

        let response = self
            .client
            .post(format!("{}/attempts", self.endpoint))
            .bearer_auth(credential_token)
            .json(&request)
            .send()
            .await
            .map_err(|err| SubmitError::Retryable(err.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(SubmitError::Terminal(parse_api_error(status, &body)))
    }
}

async fn api_error(response: reqwest::Response) -> RpcError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    RpcError::Api(parse_api_error(status, &body))
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_endpoint(raw: String) -> RpcResult<String> {
    let endpoint = normalize_text_option(Some(raw)).ok_or_else(|| {
        RpcError::InvalidConfiguration("endpoint must not be empty".to_string())
    })?;
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(RpcError::InvalidConfiguration(
            "endpoint must include http:// or https://".to_string(),
        ))
    }
}
