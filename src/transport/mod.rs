//! Transport to the remote document store
//!
//! The sync controller only ever asks the remote for two things: a fresh
//! document and the application of one edit operation. Both are expressed by
//! [`TransportClient`]; [`HttpTransport`] speaks the document server's HTTP API.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docsync::transport::{HttpTransport, HttpTransportConfig, TransportClient};
//!
//! let transport = HttpTransport::new(&HttpTransportConfig::default())?;
//! let document_id = transport.create_document().await?;
//! transport
//!     .submit_operation(&Operation::insert(&document_id, 0, "hello"))
//!     .await?;
//! ```

mod client;
#[cfg(test)]
pub(crate) mod mock;
mod types;

pub use client::{HttpTransport, TransportClient};
pub use types::{HttpTransportConfig, TransportError, DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT};
