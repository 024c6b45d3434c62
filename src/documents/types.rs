//! Document types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::utf16_len;

/// A document held by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub content: String,
    /// Incremented on every applied operation
    pub version: u64,
    pub last_modified: DateTime<Utc>,
}

impl Document {
    /// Create an empty document with a fresh id
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: String::new(),
            version: 0,
            last_modified: Utc::now(),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Document as returned by `GET /api/docs/:document_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDto {
    pub id: String,
    pub version: u64,
    pub content: String,
    /// Content length in UTF-16 code units
    pub length: usize,
    #[serde(rename = "lastModified")]
    pub last_modified: DateTime<Utc>,
}

impl From<&Document> for DocumentDto {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            version: document.version,
            content: document.content.clone(),
            length: utf16_len(&document.content),
            last_modified: document.last_modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_empty() {
        let document = Document::new();
        assert!(Uuid::parse_str(&document.id).is_ok());
        assert_eq!(document.content, "");
        assert_eq!(document.version, 0);
        assert_ne!(Document::new().id, document.id);
    }

    #[test]
    fn test_dto_serialization() {
        let mut document = Document::new();
        document.content = "a🦀".to_string();
        document.version = 3;

        let json = serde_json::to_value(DocumentDto::from(&document)).unwrap();
        assert_eq!(json["id"], document.id.as_str());
        assert_eq!(json["version"], 3);
        assert_eq!(json["length"], 3);
        assert!(json["lastModified"].is_string());
    }
}
