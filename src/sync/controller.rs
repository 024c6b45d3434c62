//! Async sync controller
//!
//! Runs a [`SyncState`] on a background task and executes its actions:
//! the quiet-period timer and the transport requests. Timer expirations and
//! transport responses are fed back into the same task, so state is only
//! ever touched from one place.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::state::{SyncAction, SyncEvent, SyncState};
use super::timer::DebounceTimer;
use super::types::{SyncConfig, SyncError, SyncSnapshot};
use crate::transport::TransportClient;

/// Handle to a running sync controller
///
/// All methods only enqueue work and return immediately. Observe progress
/// through [`SyncController::snapshot`] or [`SyncController::subscribe`].
pub struct SyncController {
    commands: mpsc::UnboundedSender<SyncEvent>,
    snapshot: watch::Receiver<SyncSnapshot>,
    task: JoinHandle<()>,
}

impl SyncController {
    /// Start a controller on the current tokio runtime
    pub fn spawn(transport: Arc<dyn TransportClient>, config: SyncConfig) -> Self {
        let state = SyncState::new(
            config.document_id.unwrap_or_default(),
            transport.is_configured(),
        );
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        tracing::debug!(
            document_id = %state.document_id(),
            quiet_period_ms = config.quiet_period.as_millis() as u64,
            "Starting sync controller"
        );

        let driver = Driver {
            state,
            transport,
            quiet_period: config.quiet_period,
            timer: DebounceTimer::new(),
            events: events_tx,
            snapshot: snapshot_tx,
        };
        let task = tokio::spawn(driver.run(commands_rx, events_rx));

        Self {
            commands: commands_tx,
            snapshot: snapshot_rx,
            task,
        }
    }

    /// Report the editor's full current text
    pub fn set_text(&self, text: impl Into<String>) -> Result<(), SyncError> {
        self.send(SyncEvent::TextChanged(text.into()))
    }

    pub fn composition_start(&self) -> Result<(), SyncError> {
        self.send(SyncEvent::CompositionStarted)
    }

    pub fn composition_end(&self) -> Result<(), SyncError> {
        self.send(SyncEvent::CompositionEnded)
    }

    /// Treat the current text as what the remote holds, without sending
    pub fn accept_baseline(&self) -> Result<(), SyncError> {
        self.send(SyncEvent::AcceptBaseline)
    }

    /// Create a fresh remote document and switch to it
    pub fn create_document(&self) -> Result<(), SyncError> {
        self.send(SyncEvent::CreateRequested)
    }

    /// Switch to an existing remote document
    pub fn set_document_id(&self, document_id: impl Into<String>) -> Result<(), SyncError> {
        self.send(SyncEvent::DocumentIdChanged(document_id.into()))
    }

    /// Latest controller state
    pub fn snapshot(&self) -> SyncSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch controller state; a new value is published after every event
    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.snapshot.clone()
    }

    /// Stop the controller, dropping any pending timer.
    ///
    /// A request already handed to the transport is not cancelled, but its
    /// response is ignored.
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Sync controller task failed");
        }
    }

    fn send(&self, event: SyncEvent) -> Result<(), SyncError> {
        self.commands.send(event).map_err(|_| SyncError::Closed)
    }
}

struct Driver {
    state: SyncState,
    transport: Arc<dyn TransportClient>,
    quiet_period: Duration,
    timer: DebounceTimer,
    events: mpsc::UnboundedSender<SyncEvent>,
    snapshot: watch::Sender<SyncSnapshot>,
}

impl Driver {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SyncEvent>,
        mut events: mpsc::UnboundedReceiver<SyncEvent>,
    ) {
        loop {
            let event = tokio::select! {
                command = commands.recv() => match command {
                    Some(event) => event,
                    None => break,
                },
                Some(event) = events.recv() => event,
            };
            self.dispatch(event);
        }

        self.timer.cancel();
        tracing::debug!(document_id = %self.state.document_id(), "Sync controller stopped");
    }

    fn dispatch(&mut self, event: SyncEvent) {
        for action in self.state.handle(event) {
            self.execute(action);
        }
        self.snapshot.send_replace(self.state.snapshot());
    }

    fn execute(&mut self, action: SyncAction) {
        match action {
            SyncAction::StartTimer { generation } => {
                let events = self.events.clone();
                self.timer.schedule(self.quiet_period, move || {
                    let _ = events.send(SyncEvent::TimerFired { generation });
                });
            }
            SyncAction::CancelTimer => {
                self.timer.cancel();
            }
            SyncAction::Submit { seq, operation } => {
                let transport = self.transport.clone();
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = transport.submit_operation(&operation).await;
                    let _ = events.send(SyncEvent::SubmitCompleted { seq, result });
                });
            }
            SyncAction::CreateDocument { seq } => {
                let transport = self.transport.clone();
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = transport.create_document().await;
                    let _ = events.send(SyncEvent::CreateCompleted { seq, result });
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use crate::sync::SyncStatus;
    use crate::transport::mock::MockTransport;
    use crate::transport::TransportError;

    const QUIET: Duration = Duration::from_millis(800);

    fn config(document_id: &str) -> SyncConfig {
        SyncConfig {
            quiet_period: QUIET,
            document_id: Some(document_id.to_string()),
        }
    }

    async fn pause(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_sends_one_operation() {
        let mock = Arc::new(MockTransport::new());
        let controller = SyncController::spawn(mock.clone(), config("doc"));

        for text in ["h", "he", "hel", "hell", "hello"] {
            controller.set_text(text).unwrap();
            pause(100).await;
        }
        assert!(mock.submitted().is_empty());
        assert_eq!(
            controller.snapshot().preview,
            Some(Operation::insert("doc", 0, "hello"))
        );

        pause(800).await;

        assert_eq!(mock.submitted(), vec![Operation::insert("doc", 0, "hello")]);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.baseline, "hello");
        assert!(snapshot.preview.is_none());
        assert!(!snapshot.is_dirty());
        assert_eq!(snapshot.status.to_string(), "INSERT ok");

        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_composition_defers_sending() {
        let mock = Arc::new(MockTransport::new());
        let controller = SyncController::spawn(mock.clone(), config("doc"));

        controller.set_text("a").unwrap();
        pause(1000).await;
        assert_eq!(mock.submitted().len(), 1);

        controller.composition_start().unwrap();
        for text in ["aㄱ", "a가", "a간"] {
            controller.set_text(text).unwrap();
            pause(1000).await;
        }
        assert_eq!(mock.submitted().len(), 1);
        assert!(controller.snapshot().preview.is_none());

        controller.composition_end().unwrap();
        pause(1000).await;

        assert_eq!(
            mock.submitted(),
            vec![
                Operation::insert("doc", 0, "a"),
                Operation::insert("doc", 1, "간"),
            ]
        );
        assert_eq!(controller.snapshot().baseline, "a간");

        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_send_is_not_retried() {
        let mock = Arc::new(MockTransport::new());
        mock.push_submit_result(Err(TransportError::Status(404)));
        let controller = SyncController::spawn(mock.clone(), config("doc"));

        controller.set_text("hi").unwrap();
        pause(1000).await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.baseline, "");
        assert_eq!(snapshot.preview, Some(Operation::insert("doc", 0, "hi")));
        assert_eq!(snapshot.status.to_string(), "INSERT failed: Server returned 404");

        pause(10_000).await;
        assert_eq!(mock.submitted().len(), 1);

        // The next edit resends everything since the last acknowledgement
        controller.set_text("hi!").unwrap();
        pause(1000).await;
        assert_eq!(mock.submitted()[1], Operation::insert("doc", 0, "hi!"));
        assert_eq!(controller.snapshot().baseline, "hi!");

        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_document_switches_target() {
        let mock = Arc::new(MockTransport::new());
        mock.push_create_result(Ok("doc-42".to_string()));
        let controller = SyncController::spawn(mock.clone(), SyncConfig::default());

        controller.set_text("draft").unwrap();
        pause(1000).await;
        assert!(mock.submitted().is_empty(), "no document to send to");

        controller.create_document().unwrap();
        pause(10).await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.document_id, "doc-42");
        assert_eq!(snapshot.working, "");
        assert_eq!(
            snapshot.status,
            SyncStatus::Created {
                document_id: "doc-42".to_string()
            }
        );

        controller.set_text("hey").unwrap();
        pause(1000).await;
        assert_eq!(mock.submitted(), vec![Operation::insert("doc-42", 0, "hey")]);

        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_submission_in_flight() {
        let mock = Arc::new(MockTransport::gated());
        let controller = SyncController::spawn(mock.clone(), config("doc"));

        controller.set_text("abc").unwrap();
        pause(1000).await;
        assert_eq!(mock.submitted().len(), 1);
        assert!(controller.snapshot().in_flight);

        controller.set_text("abcdef").unwrap();
        pause(1000).await;
        assert_eq!(mock.submitted().len(), 1, "second send waits for the first");

        mock.release(1);
        pause(10).await;
        assert_eq!(
            mock.submitted(),
            vec![
                Operation::insert("doc", 0, "abc"),
                Operation::insert("doc", 3, "def"),
            ]
        );
        assert_eq!(controller.snapshot().baseline, "abc");

        mock.release(1);
        pause(10).await;
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.baseline, "abcdef");
        assert!(!snapshot.in_flight);

        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_baseline_skips_sending() {
        let mock = Arc::new(MockTransport::new());
        let controller = SyncController::spawn(mock.clone(), config("doc"));

        controller.set_text("loaded elsewhere").unwrap();
        controller.accept_baseline().unwrap();
        pause(1000).await;

        assert!(mock.submitted().is_empty());
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.baseline, "loaded elsewhere");
        assert_eq!(snapshot.status, SyncStatus::Accepted);

        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_transport_is_never_called() {
        let mock = Arc::new(MockTransport::unconfigured());
        let controller = SyncController::spawn(mock.clone(), config("doc"));

        controller.set_text("hello").unwrap();
        controller.create_document().unwrap();
        pause(1000).await;

        assert!(mock.submitted().is_empty());
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.document_id, "doc");
        assert_eq!(snapshot.status, SyncStatus::Idle);
        assert!(snapshot.preview.is_none());

        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_to_document_later() {
        let mock = Arc::new(MockTransport::new());
        let controller = SyncController::spawn(mock.clone(), SyncConfig::default());

        controller.set_text("hello").unwrap();
        controller.set_document_id("existing").unwrap();
        pause(1000).await;

        assert_eq!(
            mock.submitted(),
            vec![Operation::insert("existing", 0, "hello")]
        );

        controller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_subscriptions() {
        let mock = Arc::new(MockTransport::new());
        let controller = SyncController::spawn(mock, config("doc"));
        let mut updates = controller.subscribe();

        controller.set_text("x").unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().working, "x");

        controller.shutdown().await;
        assert!(updates.changed().await.is_err());
    }
}
