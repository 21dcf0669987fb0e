use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use super::config::BackendConfig;
use super::types::{EvaluateRequest, Evaluation, ImproveRequest, StatusResponse};
use crate::error::CodeliaError;

/// Where the bundled backend listens unless the user overrides it.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/api";

/// HTTP client for the scoring backend.
///
/// Cheap to clone; the inner `reqwest::Client` shares its connection pool.
/// No request timeout is set: improvement calls wait on an LLM round-trip
/// and history calls must never be cut short by the client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, CodeliaError> {
        let client = reqwest::Client::builder()
            .user_agent("Codelia/1.0")
            .build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, CodeliaError> {
        // Trailing slash so `Url::join` appends instead of replacing the last segment.
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CodeliaError::InvalidInput(format!(
                "Backend URL must use http or https: {}",
                base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    /// Base URL without the trailing slash, e.g. `http://localhost:8000/api`.
    pub fn base_url(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }

    fn endpoint(&self, path: &str) -> Result<Url, CodeliaError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CodeliaError> {
        let url = self.endpoint(path)?;
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!("GET {} failed: {}", url, e);
            CodeliaError::Request(e)
        })?;
        Self::decode(&url, response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, CodeliaError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("POST {} failed: {}", url, e);
                CodeliaError::Request(e)
            })?;
        Self::decode(&url, response).await
    }

    /// Turn a response into `T`, or into a `Status` error carrying the
    /// backend's `error` field when the status is not 2xx.
    async fn decode<T: DeserializeOwned>(
        url: &Url,
        response: reqwest::Response,
    ) -> Result<T, CodeliaError> {
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            warn!("API request to {} returned {}: {}", url, status, message);
            return Err(CodeliaError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Request an improvement of `text`. Returns the raw response so the
    /// caller can keep it verbatim as the history record's payload.
    pub async fn improve(&self, text: &str, pattern_data: &Value) -> Result<Value, CodeliaError> {
        info!("Requesting improvement ({} chars)", text.chars().count());
        let response: Value = self
            .post_json("improve", &ImproveRequest { text, pattern_data })
            .await?;
        reject_error_payload(response)
    }

    pub async fn evaluate(&self, text: &str) -> Result<Evaluation, CodeliaError> {
        info!("Requesting evaluation ({} chars)", text.chars().count());
        let response: Value = self.post_json("evaluate", &EvaluateRequest { text }).await?;
        Ok(serde_json::from_value(reject_error_payload(response)?)?)
    }

    pub async fn get_config(&self) -> Result<BackendConfig, CodeliaError> {
        self.get_json("config").await
    }

    pub async fn save_config(&self, config: &BackendConfig) -> Result<StatusResponse, CodeliaError> {
        info!("Saving backend configuration (provider: {})", config.provider);
        self.post_json("config", config).await
    }

    /// Readiness probe used while the backend process starts up.
    pub async fn is_ready(&self, timeout: Duration) -> bool {
        let Ok(url) = self.endpoint("config") else {
            return false;
        };
        match self.client.get(url).timeout(timeout).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

/// The backend sometimes answers 200 with `{"error": "..."}`.
fn reject_error_payload(value: Value) -> Result<Value, CodeliaError> {
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        warn!("Backend reported an error: {}", message);
        return Err(CodeliaError::Backend(message.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.endpoint("history/delete").unwrap().as_str(),
            "http://localhost:8000/api/history/delete"
        );
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        assert!(ApiClient::new("ftp://example.com/api").is_err());
        assert!(ApiClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_get_json_decodes_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/config")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"provider":"claude","claude":{"key":"k","url":""},"project":{}}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/api", server.url())).unwrap();
        let config = client.get_config().await.unwrap();

        assert_eq!(config.provider, "claude");
        assert_eq!(config.claude.key, "k");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_surfaces_backend_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/evaluate")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"API key for openai not found"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/api", server.url())).unwrap();
        let err = client.evaluate("The system shall log in.").await.unwrap_err();

        match err {
            CodeliaError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "API key for openai not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_without_body_uses_generic_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/config")
            .with_status(500)
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/api", server.url())).unwrap();
        let err = client.get_config().await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[tokio::test]
    async fn test_improve_rejects_error_payload_with_ok_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/improve")
            .match_body(mockito::Matcher::PartialJson(json!({
                "text": "req",
                "pattern_data": {"pattern": "ubiquitous"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"No text provided"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/api", server.url())).unwrap();
        let err = client
            .improve("req", &json!({"pattern": "ubiquitous"}))
            .await
            .unwrap_err();
        assert!(matches!(err, CodeliaError::Backend(ref m) if m == "No text provided"));
    }

    #[tokio::test]
    async fn test_is_ready_false_when_unreachable() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let client = ApiClient::new("http://127.0.0.1:9/api").unwrap();
        assert!(!client.is_ready(Duration::from_millis(200)).await);
    }
}
