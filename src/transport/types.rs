//! Transport types

use std::time::Duration;

/// Default API base of the document server
pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api/docs";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL of the document API, e.g. `http://localhost:8080/api/docs`
    pub api_base: String,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Transport error types
///
/// Non-success responses and transport-level failures are both errors; the
/// sync controller treats them alike.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Transport is not configured")]
    NotConfigured,

    #[error("Server returned {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => TransportError::Status(status.as_u16()),
            None => TransportError::Request(e.to_string()),
        }
    }
}
