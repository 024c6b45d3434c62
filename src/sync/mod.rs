//! Sync Module
//!
//! Keeps a remote document in step with a local editor by sending one
//! minimal edit operation per pause in typing.
//!
//! - [`SyncState`]: the pure state machine (baseline, preview, gating)
//! - [`SyncController`]: runs the state machine with a quiet-period timer and
//!   a [`TransportClient`](crate::transport::TransportClient)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docsync::sync::{SyncConfig, SyncController};
//! use docsync::transport::{HttpTransport, HttpTransportConfig};
//!
//! let transport = Arc::new(HttpTransport::new(&HttpTransportConfig::default())?);
//! let controller = SyncController::spawn(transport, SyncConfig::default());
//!
//! controller.create_document()?;
//! controller.set_text("hello")?;
//! // ~800ms later: INSERT at 0 "hello"
//! ```

mod controller;
mod state;
mod timer;
mod types;

pub use controller::SyncController;
pub use state::{SyncAction, SyncEvent, SyncState};
pub use timer::DebounceTimer;
pub use types::{SyncConfig, SyncError, SyncSnapshot, SyncStatus, DEFAULT_QUIET_PERIOD};
