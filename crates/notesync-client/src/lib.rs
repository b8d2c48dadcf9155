//! Notesync Client - Keeps a local file in sync with a Notesync server
//!
//! This crate provides:
//! - SyncClient: HTTP calls against the document endpoint
//! - LocalDocument: the local file, versioned by its modification time
//! - pull / push / edit workflows

pub mod client;
pub mod document;
pub mod error;
pub mod workflow;

// Re-export commonly used types
pub use client::{FetchOutcome, SyncClient};
pub use document::LocalDocument;
pub use error::{ClientError, Result};
pub use workflow::{edit, pull, push, EditOutcome, PullOutcome};
