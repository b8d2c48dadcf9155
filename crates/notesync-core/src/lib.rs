//! Notesync Core - Fundamental types for the single-document sync service
//!
//! This crate provides:
//! - The whole-second `VersionToken` and its HTTP-date wire format
//! - The `ObjectLocation` naming the synced object
//! - Error types with miette diagnostics
//! - Protocol constants shared by the store, server and client

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use types::{ObjectLocation, VersionToken, VERSION_FORMAT};

/// Object metadata field carrying the version stamp
pub const VERSION_METADATA_KEY: &str = "version";

/// Content type of the stored document
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Request/response header carrying the server version
pub const VERSION_HEADER: &str = "Last-Modified";

/// Request header carrying the client version on conditional reads
pub const CLIENT_VERSION_HEADER: &str = "If-Modified-Since";

/// Request header requesting an unconditional write
pub const FORCE_HEADER: &str = "Force";

/// Request header carrying the shared secret
pub const AUTH_HEADER: &str = "X-Auth-Access-Token";

/// Maximum accepted body size for writes (1 MiB, exclusive)
pub const SIZE_LIMIT: u64 = 1024 * 1024;
