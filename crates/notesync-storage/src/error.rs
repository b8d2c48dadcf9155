// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Storage error type
#[derive(Error, Debug, Diagnostic)]
pub enum StorageError {
    /// No object stored under the key
    #[error("No such key: {bucket}/{key}")]
    #[diagnostic(
        code(storage::no_such_key),
        help("The object has not been written yet. A first write creates it")
    )]
    ObjectNotFound { bucket: String, key: String },

    /// Declared content length does not match the body
    #[error("Content length mismatch: declared {declared} bytes, body has {actual}")]
    #[diagnostic(
        code(storage::content_length_mismatch),
        help("Declare the exact body size when writing an object")
    )]
    ContentLengthMismatch { declared: u64, actual: u64 },

    /// Database error
    #[error("Database error: {message}")]
    #[diagnostic(
        code(storage::database_error),
        help("Check database logs and ensure the data directory is accessible and not corrupted")
    )]
    DatabaseError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transaction error
    #[error("Transaction error: {message}")]
    #[diagnostic(
        code(storage::transaction_error),
        help("Ensure the transaction is not already committed or aborted")
    )]
    TransactionError { message: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(storage::serialization_error),
        help("The stored object metadata may be corrupted")
    )]
    SerializationError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Remote object store request failed
    #[error("Object store error: {message}")]
    #[diagnostic(
        code(storage::remote_error),
        help("Check the bucket name, region, endpoint and credentials")
    )]
    RemoteError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Create an ObjectNotFound error
    pub fn object_not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create a ContentLengthMismatch error
    pub fn content_length_mismatch(declared: u64, actual: u64) -> Self {
        Self::ContentLengthMismatch { declared, actual }
    }

    /// Create a DatabaseError
    pub fn database_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::DatabaseError {
            message: message.into(),
            source,
        }
    }

    /// Create a TransactionError
    pub fn transaction_error(message: impl Into<String>) -> Self {
        Self::TransactionError {
            message: message.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }

    /// Create a RemoteError
    pub fn remote_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::RemoteError {
            message: message.into(),
            source,
        }
    }

    /// Whether this is the backend's "no such key" signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound { .. })
    }
}

impl From<redb::TransactionError> for StorageError {
    fn from(err: redb::TransactionError) -> Self {
        StorageError::transaction_error(format!("Transaction error: {}", err))
    }
}

impl From<redb::StorageError> for StorageError {
    fn from(err: redb::StorageError) -> Self {
        StorageError::database_error(format!("Storage error: {}", err), Some(Box::new(err)))
    }
}

impl From<redb::TableError> for StorageError {
    fn from(err: redb::TableError) -> Self {
        StorageError::database_error(format!("Table error: {}", err), Some(Box::new(err)))
    }
}

impl From<redb::CommitError> for StorageError {
    fn from(err: redb::CommitError) -> Self {
        StorageError::transaction_error(format!("Commit error: {}", err))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::serialization_error(format!("JSON error: {}", err), Some(Box::new(err)))
    }
}
