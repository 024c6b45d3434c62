//! Minimal-edit text synchronization.
//!
//! A local editor reports its full text; [`sync::SyncController`] turns each
//! pause in typing into at most one [`operation::Operation`] (INSERT, DELETE
//! or REPLACE) computed by [`diff::diff`] against the last text the remote
//! acknowledged. Composition (IME) input is never sent half-finished.
//!
//! The crate also ships the document server the client talks to
//! ([`routes::app`]), run by the `docsync-server` binary.

pub mod config;
pub mod diff;
pub mod documents;
pub mod error;
pub mod operation;
pub mod routes;
pub mod state;
pub mod sync;
pub mod text;
pub mod transport;
