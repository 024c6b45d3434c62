//! Documents Module
//!
//! Server-side document storage. Documents live in memory only and are
//! edited exclusively through [`Operation`](crate::operation::Operation)s.

mod store;
mod types;

pub use store::DocumentStore;
pub use types::{Document, DocumentDto};
