// src/client/rest.rs

//! Base REST client shared by every domain client.
//!
//! Owns the base URL, the per-request timeout and the transport-level retry
//! policy. Only idempotent requests are retried, and only on network
//! failures, timeouts and 5xx responses.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::error::{AppError, Result};
use crate::models::{EndpointConfig, ErrorBody};

/// Delay policy between transport-level retries.
#[derive(Clone)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed(Duration),
    /// Delay computed from the 1-based number of the failed attempt
    Custom(Arc<dyn Fn(u32) -> Duration + Send + Sync>),
}

impl Backoff {
    pub fn delay(&self, failed_attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Custom(f) => f(failed_attempt),
        }
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backoff::Fixed(delay) => f.debug_tuple("Fixed").field(delay).finish(),
            Backoff::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Method and body of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::Get,
            body: None,
        }
    }

    /// POST with a JSON-encoded body.
    pub fn post_json<B: Serialize + ?Sized>(body: &B) -> Result<Self> {
        Ok(Self {
            method: Method::Post,
            body: Some(serde_json::to_vec(body)?),
        })
    }
}

/// Stateless REST client; cheap to clone.
#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    timeout: Duration,
    retry_attempts: u32,
    backoff: Backoff,
}

impl RestClient {
    /// Create a client for one endpoint configuration.
    pub fn new(transport: Arc<dyn Transport>, config: &EndpointConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.base_url)?;
        if parsed.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "base URL cannot carry paths: {}",
                config.base_url
            )));
        }

        Ok(Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            retry_attempts: config.retry_attempts.max(1),
            backoff: Backoff::Fixed(config.retry_delay()),
        })
    }

    /// Replace the retry delay policy.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a relative path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request and decode the JSON response body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let value = self.request_value(path, options).await?;
        serde_json::from_value(value).map_err(|e| AppError::decode(format!("{path}: {e}")))
    }

    /// Send a request and return the raw JSON value.
    pub async fn request_value(&self, path: &str, options: RequestOptions) -> Result<Value> {
        let request = HttpRequest {
            method: options.method,
            url: self.url(path),
            body: options.body,
        };

        let attempts = if request.method.is_idempotent() {
            self.retry_attempts
        } else {
            1
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&request, path).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < attempts && error.is_retryable() => {
                    let delay = self.backoff.delay(attempt);
                    log::warn!(
                        "{} {} failed (attempt {}/{}): {}. Retrying in {:?}",
                        request.method,
                        path,
                        attempt,
                        attempts,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn send_once(&self, request: &HttpRequest, path: &str) -> Result<Value> {
        log::debug!("{} {}", request.method, request.url);

        let response = tokio::time::timeout(self.timeout, self.transport.send(request.clone()))
            .await
            .map_err(|_| AppError::timeout(path, self.timeout.as_millis() as u64))??;

        if !response.is_success() {
            return Err(Self::status_error(path, &response));
        }
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&response.body).map_err(|e| AppError::decode(format!("{path}: {e}")))
    }

    fn status_error(path: &str, response: &HttpResponse) -> AppError {
        let body = ErrorBody::parse(&response.body);
        AppError::Http {
            status: response.status,
            message: body
                .message
                .unwrap_or_else(|| format!("HTTP {} for {}", response.status, path)),
            correlation_id: body.correlation_id,
        }
    }
}

/// Percent-encode a single path segment.
pub fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::testing::MockTransport;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config() -> EndpointConfig {
        EndpointConfig {
            base_url: "https://api.example.org/".to_string(),
            timeout_ms: 1_000,
            retry_attempts: 3,
            retry_delay_ms: 100,
        }
    }

    fn client(transport: Arc<MockTransport>) -> RestClient {
        RestClient::new(transport, &config()).unwrap()
    }

    #[tokio::test]
    async fn test_builds_absolute_url() {
        let transport = Arc::new(MockTransport::new().json(200, json!({"ok": true})));
        let rest = client(transport.clone());

        let value: Value = rest
            .request("/api/v1/events?page=1", RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(value, json!({"ok": true}));
        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://api.example.org/api/v1/events?page=1")
        );
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let transport = Arc::new(MockTransport::new().json(
            404,
            json!({"message": "Event not found", "correlation_id": "c-1"}),
        ));
        let rest = client(transport.clone());

        let err = rest
            .request_value("/api/v1/events/slug/x", RequestOptions::get())
            .await
            .unwrap_err();

        match err {
            AppError::Http {
                status,
                message,
                correlation_id,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Event not found");
                assert_eq!(correlation_id.as_deref(), Some("c-1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_retries_on_server_error() {
        let transport = Arc::new(
            MockTransport::new()
                .json(503, json!({}))
                .fail(AppError::network("connection reset"))
                .json(200, json!({"events": []})),
        );
        let rest = client(transport.clone());

        let value = rest
            .request_value("/api/v1/events", RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(value, json!({"events": []}));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_gives_up_after_configured_attempts() {
        let transport = Arc::new(MockTransport::new().json(500, json!({"message": "boom"})));
        let rest = client(transport.clone());

        let err = rest
            .request_value("/api/v1/news", RequestOptions::get())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_client_errors_not_retried() {
        let transport = Arc::new(MockTransport::new().json(400, json!({"message": "bad"})));
        let rest = client(transport.clone());

        let err = rest
            .request_value("/api/v1/news", RequestOptions::get())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_post_not_retried() {
        let transport = Arc::new(MockTransport::new().json(502, json!({})));
        let rest = client(transport.clone());

        let options = RequestOptions::post_json(&json!({"email": "a@b.co"})).unwrap();
        let err = rest
            .request_value("/api/newsletter/subscribe", options)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(502));
        assert_eq!(transport.call_count(), 1);
        assert_eq!(transport.last_method(), Some(Method::Post));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_aborts_slow_request() {
        let transport = Arc::new(MockTransport::new().delayed_json(
            Duration::from_secs(5),
            200,
            json!({}),
        ));
        let rest = RestClient::new(
            transport.clone(),
            &EndpointConfig {
                retry_attempts: 1,
                ..config()
            },
        )
        .unwrap();

        let err = rest
            .request_value("/api/v1/research", RequestOptions::get())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(
            err.to_string(),
            "Request to /api/v1/research timed out after 1000ms"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_backoff_receives_attempt_numbers() {
        let transport = Arc::new(MockTransport::new().fail(AppError::network("down")));
        let seen = Arc::new(AtomicU32::new(0));
        let seen_in_backoff = Arc::clone(&seen);
        let rest = client(transport.clone()).with_backoff(Backoff::Custom(Arc::new(
            move |attempt| {
                seen_in_backoff.fetch_add(attempt, Ordering::SeqCst);
                Duration::from_millis(10)
            },
        )));

        let _ = rest.request_value("/x", RequestOptions::get()).await;

        // Called after attempts 1 and 2, never after the final one.
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_null() {
        let transport = Arc::new(MockTransport::new().respond(204, Vec::new()));
        let rest = client(transport);

        let value: Option<Value> = rest.request("/ping", RequestOptions::get()).await.unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("annual summit/2025"), "annual%20summit%2F2025");
        assert_eq!(encode_segment("plain-slug"), "plain-slug");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let transport = Arc::new(MockTransport::new());
        let config = EndpointConfig {
            base_url: "mailto:someone".to_string(),
            ..config()
        };
        assert!(RestClient::new(transport, &config).is_err());
    }
}
