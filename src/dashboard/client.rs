//! HTTP record source talking to a `readlog serve` instance

use super::source::RecordSource;
use crate::reads::lenient::records_from_values;
use crate::reads::{ApiError, ReadDraft, ReadId, ReadRecord};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Default request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Record source backed by the record store HTTP API
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRecordSource {
    /// Create a client for the store at `base_url` (e.g. `http://127.0.0.1:5000`)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Title lookup (at most three matches)
    pub async fn search_titles(&self, query: &str) -> Result<Vec<ReadRecord>> {
        let response = self
            .client
            .get(self.url("/api/v1/reads/search"))
            .query(&[("q", query)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failure(response, None).await);
        }
        let values: Vec<serde_json::Value> = response.json().await?;
        Ok(records_from_values(values))
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch_all(&self) -> Result<Vec<ReadRecord>> {
        tracing::debug!("Fetching reads from {}", self.base_url);
        let response = self.client.get(self.url("/api/v1/reads")).send().await?;
        if !response.status().is_success() {
            return Err(failure(response, None).await);
        }
        let values: Vec<serde_json::Value> = response.json().await?;
        Ok(records_from_values(values))
    }

    async fn create(&self, draft: ReadDraft) -> Result<ReadRecord> {
        let response = self
            .client
            .post(self.url("/api/v1/reads"))
            .json(&draft)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failure(response, None).await);
        }
        Ok(response.json().await?)
    }

    async fn delete(&self, id: ReadId) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/v1/reads/{}", id)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failure(response, Some(id)).await);
        }
        Ok(())
    }
}

/// Map a non-success response to a crate error
async fn failure(response: reqwest::Response, id: Option<ReadId>) -> Error {
    let status = response.status();
    let message = match response.json::<ApiError>().await {
        Ok(body) => body.error.message,
        Err(_) => status.to_string(),
    };

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Error::NotFound(id),
        (StatusCode::BAD_REQUEST, _) => Error::Validation(message),
        _ => Error::Store(format!("{}: {}", status, message)),
    }
}
