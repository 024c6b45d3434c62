//! Scriptable transport for controller tests

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::client::TransportClient;
use super::types::TransportError;
use crate::operation::Operation;

/// Records every request and answers from a script (success by default).
///
/// A gated mock holds each submission until [`MockTransport::release`] hands
/// out a permit, which keeps requests in flight for as long as a test needs.
pub struct MockTransport {
    configured: bool,
    submitted: Mutex<Vec<Operation>>,
    submit_results: Mutex<VecDeque<Result<(), TransportError>>>,
    create_results: Mutex<VecDeque<Result<String, TransportError>>>,
    gate: Option<Semaphore>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            configured: true,
            submitted: Mutex::new(Vec::new()),
            submit_results: Mutex::new(VecDeque::new()),
            create_results: Mutex::new(VecDeque::new()),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn push_submit_result(&self, result: Result<(), TransportError>) {
        self.submit_results.lock().push_back(result);
    }

    pub fn push_create_result(&self, result: Result<String, TransportError>) {
        self.create_results.lock().push_back(result);
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn submitted(&self) -> Vec<Operation> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl TransportClient for MockTransport {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn create_document(&self) -> Result<String, TransportError> {
        self.create_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok("mock-document".to_string()))
    }

    async fn submit_operation(&self, operation: &Operation) -> Result<(), TransportError> {
        self.submitted.lock().push(operation.clone());

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.submit_results.lock().pop_front().unwrap_or(Ok(()))
    }
}
