//! HTTP client for the Request Tracker REST 2.0 API.
//!
//! This module provides the `RtClient` struct for making authenticated,
//! timeout-bounded requests to RT.
//!
//! # Failure Handling
//!
//! There is no retry or backoff. Every failed call is logged (sanitized)
//! and surfaced as an `RtError`, which the tool layer turns into an error
//! record for the caller.
//!
//! # Security
//!
//! The token is never logged. All error messages are sanitized before logging.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::Config;
use crate::error::RtError;

/// The Accept header value for JSON endpoints.
const JSON_ACCEPT_HEADER: &str = "application/json";

/// The Accept header value for raw attachment content.
const BINARY_ACCEPT_HEADER: &str = "*/*";

/// Path under the RT web root where REST 2.0 lives.
const REST_PATH: &str = "/REST/2.0";

/// Maximum length for HTTP error response bodies to avoid leaking verbose RT internals.
const MAX_ERROR_BODY_LEN: usize = 500;

/// HTTP client for the RT REST 2.0 API.
///
/// Cloning is cheap; clones share the connection pool.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let client = RtClient::new(&config)?;
///
/// let ticket = client.get("/ticket/42").await?;
/// ```
#[derive(Clone)]
pub struct RtClient {
    /// The underlying HTTP client.
    http: Client,

    /// Base URL for the REST API (e.g., `https://rt.example.com/REST/2.0`).
    base_url: String,

    /// Auth token.
    /// SECURITY: Never log this value!
    token: String,

    /// Timeout applied to every request, kept for error reporting.
    timeout: Duration,
}

impl RtClient {
    /// Creates a new RT client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `RtError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self, RtError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RtError::HttpClient)?;

        Ok(Self {
            http,
            base_url: Self::normalize_base_url(&config.base_url),
            token: config.token().to_string(),
            timeout: config.timeout,
        })
    }

    /// Normalizes the base URL so it always ends with `/REST/2.0`.
    fn normalize_base_url(url: &str) -> String {
        let url = url.trim_end_matches('/');
        if url.ends_with(REST_PATH) {
            url.to_string()
        } else if url.ends_with("/REST") {
            format!("{}/2.0", url)
        } else {
            format!("{}{}", url, REST_PATH)
        }
    }

    /// Returns the normalized REST base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Renders an error for logs or tool output with the token redacted.
    pub fn sanitize(&self, error: &RtError) -> String {
        error.sanitized_display(&self.token)
    }

    /// Tests connectivity to RT.
    ///
    /// Fetches the system information endpoint, which requires a valid
    /// token, and returns the RT version string when one is reported.
    ///
    /// # Errors
    ///
    /// Returns `RtError::ConnectionTest` describing why the call failed.
    pub async fn test_connection(&self) -> Result<Option<String>, RtError> {
        tracing::debug!("Testing connection to RT server");

        match self.get("/rt").await {
            Ok(info) => {
                let version = info
                    .get("Version")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                tracing::info!(version = ?version, "Connection test successful");
                Ok(version)
            }
            Err(RtError::HttpStatus { status, .. })
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                Err(RtError::connection_test(
                    "Authentication failed - verify RT_TOKEN is correct",
                ))
            }
            Err(RtError::Timeout { duration, .. }) => Err(RtError::connection_test(format!(
                "Connection timed out after {:?} - verify RT_BASE_URL is correct and server is reachable",
                duration
            ))),
            Err(e) => Err(RtError::connection_test(self.sanitize(&e))),
        }
    }

    /// Makes a GET request and returns the parsed JSON body.
    pub async fn get(&self, path: &str) -> Result<Value, RtError> {
        self.request(Method::GET, path, None).await
    }

    /// Makes a POST request with a JSON body and returns the parsed JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, RtError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Makes a PUT request with a JSON body and returns the parsed JSON body.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, RtError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Makes a DELETE request and returns the parsed JSON body.
    pub async fn delete(&self, path: &str) -> Result<Value, RtError> {
        self.request(Method::DELETE, path, None).await
    }

    /// Makes a GET request and returns the raw response bytes.
    ///
    /// Used for attachment content, which is not JSON.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, RtError> {
        let operation = format!("GET {}", path);
        let result = async {
            let response = self
                .send(self.build(Method::GET, path, BINARY_ACCEPT_HEADER), &operation)
                .await?;
            let bytes = response.bytes().await.map_err(|e| self.classify(e, &operation))?;
            Ok(bytes.to_vec())
        }
        .await;

        self.log_failure(&operation, &result);
        result
    }

    /// Makes a JSON request to RT, logging any failure.
    ///
    /// An empty success body parses to `Value::Null`.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, RtError> {
        let operation = format!("{} {}", method, path);
        let result = async {
            let mut req = self.build(method, path, JSON_ACCEPT_HEADER);
            if let Some(body) = body {
                req = req.json(body);
            }

            let response = self.send(req, &operation).await?;
            let bytes = response.bytes().await.map_err(|e| self.classify(e, &operation))?;

            tracing::trace!(operation = %operation, bytes = bytes.len(), "RT API response");

            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            serde_json::from_slice::<Value>(&bytes).map_err(RtError::Serialization)
        }
        .await;

        self.log_failure(&operation, &result);
        result
    }

    /// Builds an authenticated request against the REST base.
    fn build(&self, method: Method, path: &str, accept: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(method = %method, path = %path, "Making RT API request");

        self.http
            .request(method, &url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", accept)
    }

    /// Sends a request and converts non-success statuses into errors.
    async fn send(
        &self,
        req: RequestBuilder,
        operation: &str,
    ) -> Result<reqwest::Response, RtError> {
        let response = req.send().await.map_err(|e| self.classify(e, operation))?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.handle_http_error(status, response).await);
        }

        Ok(response)
    }

    /// Maps a transport-level reqwest error to an `RtError`.
    fn classify(&self, error: reqwest::Error, operation: &str) -> RtError {
        if error.is_timeout() {
            RtError::timeout(self.timeout, operation)
        } else {
            RtError::Http(error)
        }
    }

    /// Handles HTTP-level errors and converts to `RtError`.
    async fn handle_http_error(&self, status: StatusCode, response: reqwest::Response) -> RtError {
        let body = response.text().await.unwrap_or_default();
        let body = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("").to_string()
        } else {
            body
        };
        let body = RtError::sanitize_message(&body, &self.token);

        RtError::HttpStatus {
            status,
            body: truncate_body(body),
        }
    }

    fn log_failure<T>(&self, operation: &str, result: &Result<T, RtError>) {
        if let Err(e) = result {
            tracing::error!(
                operation = %operation,
                error = %self.sanitize(e),
                "Error making RT request"
            );
        }
    }
}

/// Truncates an error body on a character boundary.
fn truncate_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_LEN {
        return body;
    }
    let mut end = MAX_ERROR_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
