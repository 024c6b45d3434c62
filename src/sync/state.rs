//! Sync state machine
//!
//! `SyncState` holds everything the controller knows about one document and
//! decides what should happen next. It performs no I/O: the driver feeds it
//! [`SyncEvent`]s and executes the [`SyncAction`]s it returns (arm or cancel
//! the quiet-period timer, submit an operation, create a document).
//!
//! ```text
//!              edit (differs)               timer fires
//!   Idle ───────────────────────▶ Previewing ───────────▶ Sending
//!    ▲  ◀── edit (equals baseline) ──┘  ▲                  │
//!    │                                  └── edit ──────────┤
//!    └──────────────── ack (baseline := sent text) ◀───────┘
//!
//!   Composing overrides all of the above: no preview, no timer.
//! ```
//!
//! Two guards keep the optimistic baseline update honest:
//! - at most one submission is in flight; a timer that fires meanwhile is
//!   remembered and flushed once the response arrives, unless a newer edit
//!   has started another quiet period
//! - every request carries a sequence number, and a response is applied only
//!   if it matches the request the state is still waiting on

use crate::diff::diff;
use crate::operation::Operation;
use crate::transport::TransportError;

use super::types::{SyncSnapshot, SyncStatus};

/// Inputs to the state machine
#[derive(Debug)]
pub enum SyncEvent {
    /// The editor's text changed
    TextChanged(String),
    /// An input-method composition started
    CompositionStarted,
    /// The input-method composition was committed or cancelled
    CompositionEnded,
    /// The quiet-period timer armed with `generation` elapsed
    TimerFired { generation: u64 },
    /// The transport answered submission `seq`
    SubmitCompleted {
        seq: u64,
        result: Result<(), TransportError>,
    },
    /// The user asked for a new document
    CreateRequested,
    /// The transport answered creation request `seq`
    CreateCompleted {
        seq: u64,
        result: Result<String, TransportError>,
    },
    /// Declare the current text to be what the remote holds
    AcceptBaseline,
    /// Attach to an existing remote document
    DocumentIdChanged(String),
}

/// Effects requested by the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Cancel any running quiet-period timer and start a new one
    StartTimer { generation: u64 },
    CancelTimer,
    Submit { seq: u64, operation: Operation },
    CreateDocument { seq: u64 },
}

#[derive(Debug, Clone)]
struct InFlight {
    seq: u64,
    /// Working text at the moment of send
    text: String,
    operation: Operation,
}

/// Controller state for one document
#[derive(Debug)]
pub struct SyncState {
    document_id: String,
    baseline: String,
    working: String,
    composing: bool,
    preview: Option<Operation>,
    last_sent: Option<Operation>,
    status: SyncStatus,
    transport_ready: bool,
    timer_generation: u64,
    timer_armed: bool,
    next_seq: u64,
    in_flight: Option<InFlight>,
    flush_pending: bool,
    pending_create: Option<u64>,
}

impl SyncState {
    /// Create state for `document_id` (may be empty until a document is
    /// created). Nothing is ever sent while `transport_ready` is false.
    pub fn new(document_id: impl Into<String>, transport_ready: bool) -> Self {
        Self {
            document_id: document_id.into(),
            baseline: String::new(),
            working: String::new(),
            composing: false,
            preview: None,
            last_sent: None,
            status: SyncStatus::Idle,
            transport_ready,
            timer_generation: 0,
            timer_armed: false,
            next_seq: 0,
            in_flight: None,
            flush_pending: false,
            pending_create: None,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    pub fn working(&self) -> &str {
        &self.working
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn preview(&self) -> Option<&Operation> {
        self.preview.as_ref()
    }

    pub fn last_sent(&self) -> Option<&Operation> {
        self.last_sent.as_ref()
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn timer_pending(&self) -> bool {
        self.timer_armed
    }

    /// Whether synchronization may be attempted at all
    pub fn can_sync(&self) -> bool {
        self.transport_ready && !self.document_id.is_empty()
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            document_id: self.document_id.clone(),
            baseline: self.baseline.clone(),
            working: self.working.clone(),
            composing: self.composing,
            preview: self.preview.clone(),
            last_sent: self.last_sent.clone(),
            status: self.status.clone(),
            in_flight: self.in_flight.is_some(),
            timer_pending: self.timer_armed,
        }
    }

    /// Process one event and return the effects to execute, in order
    pub fn handle(&mut self, event: SyncEvent) -> Vec<SyncAction> {
        match event {
            SyncEvent::TextChanged(text) => self.on_text_changed(text),
            SyncEvent::CompositionStarted => self.on_composition(true),
            SyncEvent::CompositionEnded => self.on_composition(false),
            SyncEvent::TimerFired { generation } => self.on_timer_fired(generation),
            SyncEvent::SubmitCompleted { seq, result } => self.on_submit_completed(seq, result),
            SyncEvent::CreateRequested => self.on_create_requested(),
            SyncEvent::CreateCompleted { seq, result } => self.on_create_completed(seq, result),
            SyncEvent::AcceptBaseline => self.on_accept_baseline(),
            SyncEvent::DocumentIdChanged(id) => self.on_document_id_changed(id),
        }
    }

    // =========================================================================
    // Event Handlers
    // =========================================================================

    fn on_text_changed(&mut self, text: String) -> Vec<SyncAction> {
        if text == self.working {
            return Vec::new();
        }
        self.working = text;
        self.evaluate()
    }

    fn on_composition(&mut self, composing: bool) -> Vec<SyncAction> {
        if self.composing == composing {
            return Vec::new();
        }
        self.composing = composing;
        self.evaluate()
    }

    fn on_timer_fired(&mut self, generation: u64) -> Vec<SyncAction> {
        if !self.timer_armed || generation != self.timer_generation {
            tracing::trace!(generation, "Ignoring superseded timer");
            return Vec::new();
        }
        self.timer_armed = false;

        if let Some(in_flight) = &self.in_flight {
            tracing::debug!(
                seq = in_flight.seq,
                "Quiet period elapsed while a send is in flight, deferring"
            );
            self.flush_pending = true;
            return Vec::new();
        }

        self.flush()
    }

    fn on_submit_completed(
        &mut self,
        seq: u64,
        result: Result<(), TransportError>,
    ) -> Vec<SyncAction> {
        let in_flight = match self.in_flight.take() {
            Some(in_flight) if in_flight.seq == seq => in_flight,
            other => {
                self.in_flight = other;
                tracing::debug!(seq, "Discarding stale submission response");
                return Vec::new();
            }
        };
        let kind = in_flight.operation.kind();

        match result {
            Ok(()) => {
                tracing::info!(
                    document_id = %self.document_id,
                    seq,
                    operation = %in_flight.operation,
                    "Operation acknowledged"
                );
                self.baseline = in_flight.text;
                self.last_sent = Some(in_flight.operation);
                self.preview = None;
                self.status = SyncStatus::Sent { kind };

                // A deferred flush with nothing left to send would only
                // overwrite the status just recorded
                if self.flush_pending && self.working != self.baseline {
                    self.flush()
                } else {
                    self.evaluate()
                }
            }
            Err(e) => {
                tracing::warn!(
                    document_id = %self.document_id,
                    seq,
                    error = %e,
                    "Operation failed, baseline unchanged"
                );
                self.status = SyncStatus::SendFailed {
                    kind,
                    reason: e.to_string(),
                };

                if self.flush_pending {
                    self.flush()
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn on_create_requested(&mut self) -> Vec<SyncAction> {
        if !self.transport_ready {
            tracing::debug!("Transport not configured, not creating a document");
            return Vec::new();
        }

        let seq = self.next_seq();
        self.pending_create = Some(seq);
        self.status = SyncStatus::Creating;
        vec![SyncAction::CreateDocument { seq }]
    }

    fn on_create_completed(
        &mut self,
        seq: u64,
        result: Result<String, TransportError>,
    ) -> Vec<SyncAction> {
        if self.pending_create != Some(seq) {
            tracing::debug!(seq, "Discarding stale create response");
            return Vec::new();
        }
        self.pending_create = None;

        match result {
            Ok(document_id) => {
                tracing::info!(document_id = %document_id, "Document created");
                self.document_id = document_id.clone();
                self.baseline.clear();
                self.working.clear();
                self.preview = None;
                self.last_sent = None;
                self.in_flight = None;
                self.flush_pending = false;
                self.status = SyncStatus::Created { document_id };
                self.cancel_timer()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Document creation failed");
                self.status = SyncStatus::CreateFailed {
                    reason: e.to_string(),
                };
                Vec::new()
            }
        }
    }

    fn on_accept_baseline(&mut self) -> Vec<SyncAction> {
        tracing::info!(document_id = %self.document_id, "Accepting current text as baseline");
        self.baseline = self.working.clone();
        self.preview = None;
        self.in_flight = None;
        self.flush_pending = false;
        self.status = SyncStatus::Accepted;
        self.cancel_timer()
    }

    fn on_document_id_changed(&mut self, document_id: String) -> Vec<SyncAction> {
        if document_id == self.document_id {
            return Vec::new();
        }
        tracing::info!(document_id = %document_id, "Attached to document");
        self.document_id = document_id;
        self.in_flight = None;
        self.flush_pending = false;
        self.evaluate()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Recompute the preview and the timer after text or composition changed.
    ///
    /// Any deferred flush is dropped: either a new quiet period starts or
    /// there is nothing to send.
    fn evaluate(&mut self) -> Vec<SyncAction> {
        self.flush_pending = false;
        if !self.can_sync() || self.composing || self.working == self.baseline {
            self.preview = None;
            return self.cancel_timer();
        }

        self.preview = diff(&self.document_id, &self.baseline, &self.working);
        self.timer_generation += 1;
        self.timer_armed = true;
        vec![SyncAction::StartTimer {
            generation: self.timer_generation,
        }]
    }

    /// Send the diff from baseline to the current text, if there is one
    fn flush(&mut self) -> Vec<SyncAction> {
        self.flush_pending = false;
        if !self.can_sync() || self.composing {
            return Vec::new();
        }

        match diff(&self.document_id, &self.baseline, &self.working) {
            None => {
                self.preview = None;
                self.status = SyncStatus::NoChange;
                Vec::new()
            }
            Some(operation) => {
                let seq = self.next_seq();
                tracing::debug!(
                    document_id = %self.document_id,
                    seq,
                    operation = %operation,
                    "Sending operation"
                );
                self.status = SyncStatus::Sending {
                    kind: operation.kind(),
                };
                self.in_flight = Some(InFlight {
                    seq,
                    text: self.working.clone(),
                    operation: operation.clone(),
                });
                vec![SyncAction::Submit { seq, operation }]
            }
        }
    }

    fn cancel_timer(&mut self) -> Vec<SyncAction> {
        if !self.timer_armed {
            return Vec::new();
        }
        self.timer_armed = false;
        // A fire already queued for the old generation is now ignored
        self.timer_generation += 1;
        vec![SyncAction::CancelTimer]
    }

    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}
