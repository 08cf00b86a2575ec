//! Configuration types for the Luskad client.

use std::fmt;
use url::Url;

/// Public Luskad API endpoint used when no URL is configured.
pub const DEFAULT_API_URL: &str = "https://app.luskad.com/api/v1";

/// Configuration for the Luskad client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the Luskad API, including its version prefix.
    pub base_url: Url,
    /// Bearer token sent with every request.
    pub api_key: String,
    /// User agent reported to the API.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new configuration for the given endpoint and credential.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            user_agent: default_user_agent(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

pub(crate) fn default_user_agent() -> String {
    format!("luskad-mcp/{}", env!("CARGO_PKG_VERSION"))
}
