//! Shared HTTP client for the policy backend

use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use core_kernel::PortError;

const SERVICE_NAME: &str = "policy backend";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_ERROR_BODY: usize = 200;

/// Configuration for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the backend, e.g. "https://backend.example.com"
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Bearer token sent with authenticated calls
    pub token: Option<String>,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    token: RwLock<Option<String>>,
}

/// Cheaply cloneable handle on a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

impl ApiClient {
    /// Builds the client
    ///
    /// # Errors
    ///
    /// `PortError::Internal` when the TLS backend cannot be initialised.
    pub fn new(config: ApiClientConfig) -> Result<Self, PortError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(config.timeout))
            .timeout(config.timeout)
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                timeout: config.timeout,
                token: RwLock::new(config.token),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Replaces the bearer token, e.g. after login or logout
    pub async fn set_token(&self, token: Option<String>) {
        *self.inner.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Appends `segments` to the base URL, percent-encoding each one
    ///
    /// A segment may carry `/`, `?` or spaces without escaping the endpoint.
    pub fn url_with_segments(&self, segments: &[&str]) -> Result<Url, PortError> {
        let mut url = Url::parse(&self.inner.base_url).map_err(|e| {
            PortError::internal(format!("invalid base URL {}: {e}", self.inner.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                PortError::internal(format!("base URL {} cannot take a path", self.inner.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GETs `path` and decodes the JSON body
    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PortError> {
        let request = self.inner.http.get(self.url(path));
        let response = self.send(request, path).await?;
        self.decode(response, path).await
    }

    /// GETs the endpoint built from `segments` and decodes the JSON body
    #[instrument(skip(self))]
    pub async fn get_json_segments<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, PortError> {
        let url = self.url_with_segments(segments)?;
        let path = url.path().to_string();
        let response = self.send(self.inner.http.get(url), &path).await?;
        self.decode(response, &path).await
    }

    /// POSTs `body` as JSON with the bearer token and decodes the JSON reply
    #[instrument(skip(self, body))]
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, PortError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.inner.http.post(self.url(path)).json(body);
        let response = self.send(request, path).await?;
        self.decode(response, path).await
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, PortError> {
        let request = match self.inner.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e, path))?;

        let status = response.status();
        debug!(%status, "Backend responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = status_error(status, &body, path);
        warn!(%status, error = %error, "Backend request failed");
        Err(error)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response, path: &str) -> Result<T, PortError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e, path))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            PortError::transformation(format!("unexpected response from {path}: {e}"))
        })
    }

    fn transport_error(&self, error: reqwest::Error, path: &str) -> PortError {
        if error.is_timeout() {
            return PortError::Timeout {
                operation: path.to_string(),
                duration_ms: u64::try_from(self.inner.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }
        if error.is_connect() {
            return PortError::Connection {
                message: format!("cannot reach {SERVICE_NAME}"),
                source: Some(Box::new(error)),
            };
        }
        if error.is_decode() || error.is_body() {
            return PortError::transformation(error.to_string());
        }
        PortError::Internal {
            message: format!("request to {path} failed"),
            source: Some(Box::new(error)),
        }
    }
}

/// Maps a non-success status to a [`PortError`]
///
/// The server's `message` field is used as the error text when present.
pub fn status_error(status: StatusCode, body: &str, path: &str) -> PortError {
    let message = serde_json::from_str::<MessageBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.chars().take(MAX_ERROR_BODY).collect());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized { message },
        StatusCode::NOT_FOUND => PortError::not_found("resource", path),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => PortError::validation(message),
        s if s.is_server_error() => PortError::ServiceUnavailable {
            service: SERVICE_NAME.to_string(),
        },
        s => PortError::internal(format!("unexpected status {s}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "", "/api/payment"),
            PortError::Unauthorized { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "", "/api/payment"),
            PortError::Unauthorized { .. }
        ));
        assert!(status_error(StatusCode::NOT_FOUND, "", "/api/get-rate/A/1").is_not_found());
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "", "/api/payment"),
            PortError::ServiceUnavailable { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::IM_A_TEAPOT, "", "/api/payment"),
            PortError::Internal { .. }
        ));
    }

    #[test]
    fn test_server_message_is_kept() {
        let err = status_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Policy is lapsed"}"#,
            "/api/payment",
        );
        assert_eq!(err.to_string(), "Validation error: Policy is lapsed");
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new(ApiClientConfig::new("http://localhost:8000/")).unwrap();
        assert_eq!(client.url("/api/payment"), "http://localhost:8000/api/payment");
        assert_eq!(client.url("api/payment"), "http://localhost:8000/api/payment");
    }

    #[test]
    fn test_segments_are_percent_encoded() {
        let client = ApiClient::new(ApiClientConfig::new("http://localhost:8000/")).unwrap();
        let url = client
            .url_with_segments(&["api", "get-rate", "A B/C?", "012030"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/get-rate/A%20B%2FC%3F/012030");
    }

    #[test]
    fn test_segments_keep_base_path() {
        let client = ApiClient::new(ApiClientConfig::new("http://localhost:8000/backend")).unwrap();
        let url = client.url_with_segments(&["api", "payment"]).unwrap();
        assert_eq!(url.path(), "/backend/api/payment");
    }

    #[tokio::test]
    async fn test_token_can_be_replaced() {
        let client = ApiClient::new(ApiClientConfig::new("http://localhost").token("abc")).unwrap();
        assert!(client.has_token().await);
        client.set_token(None).await;
        assert!(!client.has_token().await);
    }
}
