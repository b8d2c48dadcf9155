//! Notesync Storage - Object storage abstraction and backends
//!
//! This crate provides:
//! - ObjectBackend trait (head / get / put with metadata)
//! - redb-based persistent implementation
//! - S3 implementation for AWS and S3-compatible services
//! - In-memory implementation for tests and ephemeral servers

pub mod backend;
pub mod error;
pub mod memory;
pub mod redb_backend;
pub mod s3_backend;

// Re-export commonly used types
pub use backend::{ObjectBackend, ObjectData, ObjectMetadata, PutObject};
pub use error::{Result, StorageError};
pub use memory::MemoryObjectStore;
pub use redb_backend::RedbObjectStore;
pub use s3_backend::{S3Config, S3ObjectStore};
