//! Atlas Data API HTTP client

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{AtlasError, Result};

/// Connection settings for one Atlas app / cluster / database
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    /// Data API app id (the `data-xxxxx` part of the endpoint URL)
    pub app_id: String,
    /// Data API key, sent as the `api-key` header
    pub api_key: String,
    /// Cluster name, the Data API's `dataSource`
    pub data_source: String,
    /// Database name
    pub database: String,
}

/// Client for the MongoDB Atlas Data API
pub struct AtlasClient {
    http: reqwest::Client,
    endpoint: String,
    config: AtlasConfig,
}

/// Counts reported by `updateOne`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCounts {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    documents: Vec<Value>,
}

impl AtlasClient {
    /// Create a client against the hosted Data API endpoint for the
    /// configured app id (30 second timeout)
    pub fn new(config: AtlasConfig) -> Self {
        let endpoint = format!(
            "https://data.mongodb-api.com/app/{}/endpoint/data/v1",
            config.app_id
        );
        Self::with_endpoint(&endpoint, config)
    }

    /// Create a client against a custom Data API endpoint
    pub fn with_endpoint(endpoint: &str, config: AtlasConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            config,
        }
    }

    /// Find the first document matching `filter` under the given sort
    /// order. Uses `action/find` with `limit: 1` because the Data API's
    /// `findOne` action does not accept a sort.
    pub async fn find_one_sorted(
        &self,
        collection: &str,
        filter: Value,
        sort: Value,
    ) -> Result<Option<Value>> {
        let body = json!({
            "dataSource": self.config.data_source,
            "database": self.config.database,
            "collection": collection,
            "filter": filter,
            "sort": sort,
            "limit": 1,
        });

        let response: FindResponse = self.action("find", body).await?;
        Ok(response.documents.into_iter().next())
    }

    /// Update a single document matching `filter` with the given update
    /// document (e.g. `{"$set": {...}}`)
    pub async fn update_one(
        &self,
        collection: &str,
        filter: Value,
        update: Value,
    ) -> Result<UpdateCounts> {
        let body = json!({
            "dataSource": self.config.data_source,
            "database": self.config.database,
            "collection": collection,
            "filter": filter,
            "update": update,
        });

        self.action("updateOne", body).await
    }

    async fn action<T: for<'de> Deserialize<'de>>(&self, action: &str, body: Value) -> Result<T> {
        let url = format!("{}/action/{}", self.endpoint, action);
        debug!(action, url = %url, "Calling Atlas Data API");

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AtlasError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
