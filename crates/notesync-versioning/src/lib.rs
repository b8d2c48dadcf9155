//! Notesync Versioning - Optimistic concurrency over a single stored object
//!
//! This crate provides:
//! - VersionedObjectStore: version-aware get / put / overwrite
//! - The read and write decision tables that classify version pairs
//! - The error taxonomy surfaced to the HTTP layer

pub mod conflict;
pub mod error;
pub mod store;

// Re-export commonly used types
pub use conflict::{decide_read, decide_write, ReadDecision, WriteDecision};
pub use error::{ErrorKind, Result, VersioningError};
pub use store::VersionedObjectStore;
