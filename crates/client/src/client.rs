//! Main client for the Luskad API.

use crate::api::{ProjectApi, ResourceRequest};
use crate::config::{default_user_agent, ClientConfig, DEFAULT_API_URL};
use crate::error::{LuskadError, LuskadResult};
use crate::transport::HttpTransport;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};
use url::Url;

/// Client for the Luskad API.
#[derive(Debug, Clone)]
pub struct LuskadClient {
    config: Arc<ClientConfig>,
    http: HttpTransport,
}

impl LuskadClient {
    /// Create a new client builder.
    pub fn builder() -> LuskadClientBuilder {
        LuskadClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> LuskadResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Fetch a resource, reporting why it failed.
    pub async fn try_fetch(&self, request: &ResourceRequest) -> LuskadResult<Value> {
        self.http
            .get_json(&request.segments(), &request.query_pairs())
            .await
    }
}

#[async_trait::async_trait]
impl ProjectApi for LuskadClient {
    async fn fetch(&self, request: &ResourceRequest) -> Option<Value> {
        let resource = request.resource().label();

        match self.try_fetch(request).await {
            Ok(value) => Some(value),
            Err(LuskadError::Api { status, message }) => {
                warn!(
                    status = status,
                    project_id = request.project_id(),
                    body = %message,
                    "Failed to fetch {}",
                    resource
                );
                None
            }
            Err(e) => {
                error!(
                    project_id = request.project_id(),
                    error = %e,
                    "Error fetching {}",
                    resource
                );
                None
            }
        }
    }
}

/// Builder for creating a LuskadClient.
pub struct LuskadClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
}

impl LuskadClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
        }
    }

    /// Set the base URL of the Luskad API. Defaults to [`DEFAULT_API_URL`].
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> LuskadResult<LuskadClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| LuskadError::Config("api_key is required".to_string()))?;

        let base_url = match self.base_url.as_deref() {
            Some(url) if !url.is_empty() => Url::parse(url)?,
            _ => Url::parse(DEFAULT_API_URL)?,
        };

        let config = ClientConfig {
            base_url,
            api_key,
            user_agent: default_user_agent(),
        };

        LuskadClient::from_config(config)
    }
}

impl Default for LuskadClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
