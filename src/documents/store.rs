//! In-memory document store

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use super::types::{Document, DocumentDto};
use crate::error::{AppError, Result};
use crate::operation::Operation;

/// Documents indexed by id
///
/// Cloning is cheap and every clone sees the same documents.
#[derive(Clone, Default)]
pub struct DocumentStore {
    documents: Arc<RwLock<HashMap<String, Document>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document and return its id
    pub async fn create(&self) -> String {
        let document = Document::new();
        let id = document.id.clone();

        self.documents.write().await.insert(id.clone(), document);

        tracing::info!(document_id = %id, "Created document");
        id
    }

    pub async fn get(&self, document_id: &str) -> Result<DocumentDto> {
        let documents = self.documents.read().await;
        documents
            .get(document_id)
            .map(DocumentDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Document not found: {}", document_id)))
    }

    /// Validate and apply one operation.
    ///
    /// The document is left untouched when the operation is rejected.
    pub async fn apply(&self, operation: &Operation) -> Result<DocumentDto> {
        operation.validate()?;

        let mut documents = self.documents.write().await;
        let document = documents.get_mut(operation.document_id()).ok_or_else(|| {
            AppError::NotFound(format!("Document not found: {}", operation.document_id()))
        })?;

        document.content = operation.apply(&document.content)?;
        document.version += 1;
        document.last_modified = Utc::now();

        tracing::debug!(
            document_id = %document.id,
            version = document.version,
            operation = %operation,
            "Applied operation"
        );

        Ok(DocumentDto::from(&*document))
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}
