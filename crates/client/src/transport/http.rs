//! HTTP transport layer for the Luskad client.

use crate::config::ClientConfig;
use crate::error::{LuskadError, LuskadResult};
use reqwest::{header, Client};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// HTTP transport for making API requests.
///
/// Every request carries the configured credential as a bearer token. There is no
/// retry and no client-side timeout; a failed call is reported to the caller as is.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> LuskadResult<Self> {
        let mut headers = header::HeaderMap::new();

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| LuskadError::Config("Invalid API key format".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build a URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded and the base path prefix (e.g. `/api/v1`) is kept,
    /// whether or not the base URL ends with a slash.
    pub(crate) fn build_url(&self, segments: &[&str]) -> LuskadResult<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                LuskadError::Config(format!(
                    "Base URL cannot carry a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Execute a GET request and parse the body as JSON.
    ///
    /// Non-success statuses become [`LuskadError::Api`]; bodies that are not JSON become
    /// [`LuskadError::Json`].
    pub async fn get_json(&self, segments: &[&str], query: &[(&str, &str)]) -> LuskadResult<Value> {
        let url = self.build_url(segments)?;
        debug!(url = %url, query = ?query, "GET request");

        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LuskadError::from_response(status.as_u16(), &body));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_config(base_url: &str) -> Arc<ClientConfig> {
        Arc::new(ClientConfig::new(
            Url::parse(base_url).unwrap(),
            "sk-test-key",
        ))
    }

    #[tokio::test]
    async fn test_get_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"id": "p1", "name": "Apollo"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result = transport.get_json(&["projects"], &[]).await.unwrap();
        assert_eq!(result[0]["name"], "Apollo");
    }

    #[tokio::test]
    async fn test_authorization_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .and(header("Authorization", "Bearer sk-test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result = transport.get_json(&["projects"], &[]).await.unwrap();
        assert_eq!(result, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_query_parameters_forwarded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/P/throughput"))
            .and(query_param("start_date", "2024-01-01"))
            .and(query_param("end_date", "2024-01-31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"a": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result = transport
            .get_json(
                &["projects", "P", "throughput"],
                &[("start_date", "2024-01-01"), ("end_date", "2024-01-31")],
            )
            .await
            .unwrap();
        assert_eq!(result, serde_json::json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_no_query_string_without_parameters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/P/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();
        transport.get_json(&["projects", "P", "tasks"], &[]).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_error_on_400() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "Bad Request"})),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result = transport.get_json(&["projects"], &[]).await;
        match result {
            Err(LuskadError::Api { status, .. }) => assert_eq!(status, 400),
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_on_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&server.uri())).unwrap();

        let result = transport.get_json(&["projects"], &[]).await;
        assert!(matches!(result, Err(LuskadError::Json(_))));
    }

    #[tokio::test]
    async fn test_build_url_keeps_base_path() {
        let transport =
            HttpTransport::new(create_config("https://app.luskad.com/api/v1")).unwrap();

        let url = transport.build_url(&["projects", "42", "tasks"]).unwrap();
        assert_eq!(url.as_str(), "https://app.luskad.com/api/v1/projects/42/tasks");
    }

    #[tokio::test]
    async fn test_build_url_with_trailing_slash() {
        let transport =
            HttpTransport::new(create_config("https://app.luskad.com/api/v1/")).unwrap();

        let url = transport.build_url(&["projects"]).unwrap();
        assert_eq!(url.as_str(), "https://app.luskad.com/api/v1/projects");
    }

    #[tokio::test]
    async fn test_build_url_encodes_segments() {
        let transport = HttpTransport::new(create_config("http://localhost:8080")).unwrap();

        let url = transport.build_url(&["projects", "a/b c", "risks"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/projects/a%2Fb%20c/risks");
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        let config = Arc::new(ClientConfig::new(
            Url::parse("http://localhost").unwrap(),
            "bad\nkey",
        ));

        let result = HttpTransport::new(config);
        assert!(matches!(result, Err(LuskadError::Config(_))));
    }
}
