//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::documents::DocumentStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    documents: DocumentStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_store(config, DocumentStore::new())
    }

    /// Create state around an existing store
    pub fn with_store(config: Config, documents: DocumentStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, documents }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the document store
    pub fn documents(&self) -> &DocumentStore {
        &self.inner.documents
    }
}
