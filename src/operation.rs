//! Edit operations
//!
//! A single edit that turns one snapshot of a document into the next. The
//! JSON form is the wire format shared by the sync client and the document
//! server:
//!
//! ```json
//! { "op": "INSERT",  "documentId": "…", "at": 5, "text": " world" }
//! { "op": "DELETE",  "documentId": "…", "start": 5, "end": 11 }
//! { "op": "REPLACE", "documentId": "…", "start": 1, "end": 2, "text": "u" }
//! ```
//!
//! All offsets are UTF-16 code units (see [`crate::text`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::{utf16_len, utf16_to_byte};

/// An edit against a remote document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "UPPERCASE")]
pub enum Operation {
    /// Insert `text` at position `at`
    Insert {
        #[serde(rename = "documentId")]
        document_id: String,
        at: usize,
        text: String,
    },
    /// Remove the half-open range `[start, end)`
    Delete {
        #[serde(rename = "documentId")]
        document_id: String,
        start: usize,
        end: usize,
    },
    /// Replace the half-open range `[start, end)` with `text`
    Replace {
        #[serde(rename = "documentId")]
        document_id: String,
        start: usize,
        end: usize,
        text: String,
    },
}

/// Discriminator of an [`Operation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    Insert,
    Delete,
    Replace,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Insert => "INSERT",
            OperationKind::Delete => "DELETE",
            OperationKind::Replace => "REPLACE",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from validating or applying an operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("Missing document id")]
    MissingDocumentId,

    #[error("{0} requires non-empty text")]
    EmptyText(OperationKind),

    #[error("Invalid range: start {start} must be less than end {end}")]
    InvalidRange { start: usize, end: usize },

    #[error("Offset {offset} is out of range for document length {len}")]
    OutOfRange { offset: usize, len: usize },

    #[error("Offset {0} falls inside a surrogate pair")]
    SplitsCharacter(usize),
}

impl Operation {
    pub fn insert(document_id: impl Into<String>, at: usize, text: impl Into<String>) -> Self {
        Operation::Insert {
            document_id: document_id.into(),
            at,
            text: text.into(),
        }
    }

    pub fn delete(document_id: impl Into<String>, start: usize, end: usize) -> Self {
        Operation::Delete {
            document_id: document_id.into(),
            start,
            end,
        }
    }

    pub fn replace(
        document_id: impl Into<String>,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> Self {
        Operation::Replace {
            document_id: document_id.into(),
            start,
            end,
            text: text.into(),
        }
    }

    /// Document this operation targets
    pub fn document_id(&self) -> &str {
        match self {
            Operation::Insert { document_id, .. }
            | Operation::Delete { document_id, .. }
            | Operation::Replace { document_id, .. } => document_id,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Insert { .. } => OperationKind::Insert,
            Operation::Delete { .. } => OperationKind::Delete,
            Operation::Replace { .. } => OperationKind::Replace,
        }
    }

    /// Check the shape invariants: a document id, a non-empty range for
    /// DELETE/REPLACE and non-empty text for INSERT/REPLACE.
    ///
    /// Offsets are only checked against the document in [`Operation::apply`].
    pub fn validate(&self) -> Result<(), OperationError> {
        if self.document_id().is_empty() {
            return Err(OperationError::MissingDocumentId);
        }

        match self {
            Operation::Insert { text, .. } => {
                if text.is_empty() {
                    return Err(OperationError::EmptyText(OperationKind::Insert));
                }
            }
            Operation::Delete { start, end, .. } => {
                if start >= end {
                    return Err(OperationError::InvalidRange {
                        start: *start,
                        end: *end,
                    });
                }
            }
            Operation::Replace {
                start, end, text, ..
            } => {
                if start >= end {
                    return Err(OperationError::InvalidRange {
                        start: *start,
                        end: *end,
                    });
                }
                if text.is_empty() {
                    return Err(OperationError::EmptyText(OperationKind::Replace));
                }
            }
        }

        Ok(())
    }

    /// Apply the operation to `content`, returning the edited text.
    pub fn apply(&self, content: &str) -> Result<String, OperationError> {
        let len = utf16_len(content);

        match self {
            Operation::Insert { at, text, .. } => splice(content, len, *at, *at, text),
            Operation::Delete { start, end, .. } => splice(content, len, *start, *end, ""),
            Operation::Replace {
                start, end, text, ..
            } => splice(content, len, *start, *end, text),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert { at, text, .. } => write!(f, "INSERT at {} {:?}", at, text),
            Operation::Delete { start, end, .. } => write!(f, "DELETE [{}, {})", start, end),
            Operation::Replace {
                start, end, text, ..
            } => write!(f, "REPLACE [{}, {}) {:?}", start, end, text),
        }
    }
}

fn splice(
    content: &str,
    len: usize,
    start: usize,
    end: usize,
    replacement: &str,
) -> Result<String, OperationError> {
    if start > end {
        return Err(OperationError::InvalidRange { start, end });
    }
    let start_byte = byte_offset(content, len, start)?;
    let end_byte = byte_offset(content, len, end)?;

    let mut out =
        String::with_capacity(content.len() - (end_byte - start_byte) + replacement.len());
    out.push_str(&content[..start_byte]);
    out.push_str(replacement);
    out.push_str(&content[end_byte..]);
    Ok(out)
}

fn byte_offset(content: &str, len: usize, offset: usize) -> Result<usize, OperationError> {
    if offset > len {
        return Err(OperationError::OutOfRange { offset, len });
    }
    utf16_to_byte(content, offset).ok_or(OperationError::SplitsCharacter(offset))
}
