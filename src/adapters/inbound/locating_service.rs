use async_trait::async_trait;
use reqwest::Client;

use crate::common::{ApplicationError, ApplicationResult};
use crate::config::LocatingConfig;
use crate::domains::tracking::{SnapshotSource, TagId, TagRecord, TagsResponse};

const API_KEY_HEADER: &str = "X-ApiKey";

/// HTTP client for the locating service's tag endpoints.
pub struct HttpLocatingService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpLocatingService {
    pub fn new(config: &LocatingConfig) -> ApplicationResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApplicationError::Fetch(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApplicationResult<T> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| ApplicationError::Fetch(format!("request to {} failed: {}", url, e)))?
            .error_for_status()
            .map_err(|e| ApplicationError::Fetch(format!("HTTP error: {}", e)))?;

        response
            .json::<T>()
            .await
            .map_err(|e| ApplicationError::Fetch(format!("undecodable body from {}: {}", url, e)))
    }
}

#[async_trait]
impl SnapshotSource for HttpLocatingService {
    async fn fetch_all(&self) -> ApplicationResult<Vec<TagRecord>> {
        let body: TagsResponse = self.get_json(&self.base_url).await?;
        tracing::debug!("Fetched {} tag records", body.results.len());
        Ok(body.results)
    }

    async fn fetch_tag(&self, id: TagId) -> ApplicationResult<TagRecord> {
        let url = format!("{}/{}", self.base_url, id);
        self.get_json(&url).await
    }
}
