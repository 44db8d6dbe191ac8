//! # HTTP Client Utilities
//!
//! Shared HTTP client wrapper for the source clients.
//!
//! Provides:
//! - Configurable timeouts
//! - Trace id propagation through the `X-Trace-Id` header
//! - "Not found" reported as `None` rather than an error
//!
//! # Examples
//!
//! ```ignore
//! use asset_aggregator::infrastructure::sources::http_client::HttpClient;
//!
//! let client = HttpClient::new(2000)?;
//! let body: Option<serde_json::Value> = client.get_optional(url, &trace_id).await?;
//! ```

use crate::domain::value_objects::TraceId;
use crate::infrastructure::sources::error::{SourceError, SourceResult};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Header carrying the request trace id.
pub const TRACE_HEADER: &str = "X-Trace-Id";

/// Longest error body excerpt kept in a [`SourceError`].
const MAX_ERROR_BODY: usize = 256;

/// HTTP client wrapper for source clients.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client.
    client: Client,
    /// Request timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Configuration` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| SourceError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request carrying the trace header and deserializes the
    /// JSON response.
    ///
    /// Returns `Ok(None)` on HTTP 404.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Timeout` or `SourceError::Connection` if the
    /// request fails, `SourceError::HttpStatus` for other non-success
    /// statuses and `SourceError::InvalidResponse` if the body cannot be
    /// parsed.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        url: &str,
        trace_id: &TraceId,
    ) -> SourceResult<Option<T>> {
        let response = self
            .client
            .get(url)
            .headers(trace_headers(trace_id))
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(response).await.map(Some)
    }

    /// Handles the HTTP response, checking status and deserializing JSON.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> SourceResult<T> {
        let status = response.status();

        if status.is_success() {
            response.json::<T>().await.map_err(|e| {
                SourceError::invalid_response(format!("Failed to parse response: {e}"))
            })
        } else {
            let error_body = response.text().await.unwrap_or_default();
            Err(self.map_status_error(status, &error_body))
        }
    }

    /// Maps a reqwest error to a SourceError.
    fn map_reqwest_error(&self, error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            SourceError::timeout_with_duration("Request timed out", self.timeout_ms)
        } else if error.is_connect() {
            SourceError::connection(format!("Connection failed: {error}"))
        } else {
            SourceError::connection(format!("HTTP request failed: {error}"))
        }
    }

    /// Maps an HTTP status code to a SourceError.
    fn map_status_error(&self, status: StatusCode, body: &str) -> SourceError {
        let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
        SourceError::http_status(status.as_u16(), excerpt)
    }
}

fn trace_headers(trace_id: &TraceId) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        headers.insert(TRACE_HEADER, value);
    }
    headers
}
