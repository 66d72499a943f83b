//! HTTP client abstraction for testability.

use std::time::Duration;

use thiserror::Error;

/// Transport-level failures, kept separate from HTTP status handling so the
/// lookup client can map each class to its own user-facing message.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// A completed HTTP exchange: status code plus body text.
///
/// The body is carried as text because the TechTrack API returns JSON on
/// every path we care about; decoding happens at the lookup boundary.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Trait for HTTP GET operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request with the given headers.
    ///
    /// Returns the response (any status) or a transport-level error.
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, HttpError>;
}

/// Real HTTP client implementation using reqwest's blocking API.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, HttpError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().map_err(classify_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(classify_error)?;

        Ok(HttpResponse { status, body })
    }
}

/// Map a reqwest error to the transport taxonomy.
fn classify_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_connect() {
        HttpError::Connection(e.to_string())
    } else {
        HttpError::Other(e.to_string())
    }
}

/// Canonical reason phrase for an HTTP status code ("Not Found" for 404).
pub(crate) fn status_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}
