//! Sync data types
//!
//! Defines types for observing and configuring the sync controller:
//! - Narrative sync status
//! - Point-in-time snapshots of controller state
//! - Controller configuration

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::operation::{Operation, OperationKind};

/// Default quiet period before a pending edit is sent
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(800);

/// Sync status, for display only
///
/// Nothing in the controller branches on this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncStatus {
    Idle,
    Creating,
    Created {
        #[serde(rename = "documentId")]
        document_id: String,
    },
    CreateFailed {
        reason: String,
    },
    Sending {
        kind: OperationKind,
    },
    Sent {
        kind: OperationKind,
    },
    SendFailed {
        kind: OperationKind,
        reason: String,
    },
    NoChange,
    Accepted,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Idle => f.write_str("Idle"),
            SyncStatus::Creating => f.write_str("Creating document..."),
            SyncStatus::Created { document_id } => write!(f, "Created: {}", document_id),
            SyncStatus::CreateFailed { reason } => write!(f, "Create failed: {}", reason),
            SyncStatus::Sending { kind } => write!(f, "{} sending...", kind),
            SyncStatus::Sent { kind } => write!(f, "{} ok", kind),
            SyncStatus::SendFailed { kind, reason } => write!(f, "{} failed: {}", kind, reason),
            SyncStatus::NoChange => f.write_str("No change"),
            SyncStatus::Accepted => f.write_str("Accepted current text as server baseline"),
        }
    }
}

/// Point-in-time view of the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSnapshot {
    #[serde(rename = "documentId")]
    pub document_id: String,
    /// Text believed to match the remote
    pub baseline: String,
    /// Text currently in the editor
    pub working: String,
    pub composing: bool,
    /// Operation that would be sent once the quiet period elapses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Operation>,
    /// Last operation the remote acknowledged
    #[serde(rename = "lastSent", skip_serializing_if = "Option::is_none")]
    pub last_sent: Option<Operation>,
    pub status: SyncStatus,
    /// Whether a submission is awaiting its response
    #[serde(rename = "inFlight")]
    pub in_flight: bool,
    /// Whether the quiet-period timer is running
    #[serde(rename = "timerPending")]
    pub timer_pending: bool,
}

impl SyncSnapshot {
    /// Whether the editor holds edits the remote has not acknowledged
    pub fn is_dirty(&self) -> bool {
        self.baseline != self.working
    }
}

/// Sync controller configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period restarted by every qualifying edit
    pub quiet_period: Duration,
    /// Existing remote document to attach to
    pub document_id: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            document_id: None,
        }
    }
}

/// Controller errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("Sync controller has shut down")]
    Closed,
}
