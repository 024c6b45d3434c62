//! Transport clients
//!
//! Defines the transport trait and the HTTP implementation.

use async_trait::async_trait;

use super::types::{HttpTransportConfig, TransportError};
use crate::documents::DocumentDto;
use crate::operation::Operation;

/// Remote document store as seen by the sync controller
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Whether the transport has an endpoint to talk to.
    ///
    /// The controller never attempts a request while this is false.
    fn is_configured(&self) -> bool {
        true
    }

    /// Create an empty document and return its identifier
    async fn create_document(&self) -> Result<String, TransportError>;

    /// Ask the remote to apply one operation
    async fn submit_operation(&self, operation: &Operation) -> Result<(), TransportError>;
}

/// HTTP client for the document server
///
/// - `POST {api_base}/create` returns the new id as plain text
/// - `PATCH {api_base}/operations` takes the operation as JSON
/// - `GET {api_base}/{id}` returns the document
#[derive(Debug, Clone)]
pub struct HttpTransport {
    api_base: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpTransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    /// Fetch the remote copy of a document
    pub async fn fetch_document(&self, document_id: &str) -> Result<DocumentDto, TransportError> {
        if !self.is_configured() {
            return Err(TransportError::NotConfigured);
        }

        let url = self.url(&urlencoding::encode(document_id));
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(format!("Failed to parse document: {}", e)))
    }
}

#[async_trait]
impl TransportClient for HttpTransport {
    fn is_configured(&self) -> bool {
        !self.api_base.is_empty()
    }

    async fn create_document(&self) -> Result<String, TransportError> {
        if !self.is_configured() {
            return Err(TransportError::NotConfigured);
        }

        let response = self.client.post(self.url("create")).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let document_id = body.trim();
        if document_id.is_empty() {
            return Err(TransportError::InvalidResponse(
                "Empty document id".to_string(),
            ));
        }

        tracing::debug!(document_id = %document_id, "Created remote document");
        Ok(document_id.to_string())
    }

    async fn submit_operation(&self, operation: &Operation) -> Result<(), TransportError> {
        if !self.is_configured() {
            return Err(TransportError::NotConfigured);
        }

        let response = self
            .client
            .patch(self.url("operations"))
            .json(operation)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                document_id = %operation.document_id(),
                status = status.as_u16(),
                "Operation rejected"
            );
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(())
    }
}
