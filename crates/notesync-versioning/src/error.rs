// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use notesync_core::VersionToken;
use notesync_storage::StorageError;
use thiserror::Error;

/// Versioning error type
#[derive(Error, Debug, Diagnostic)]
pub enum VersioningError {
    /// The document has never been written
    #[error("Object not found: {location}")]
    #[diagnostic(
        code(versioning::not_found),
        help("Write the document once to create it")
    )]
    NotFound { location: String },

    /// The stored version metadata is missing or unparsable
    #[error("Invalid stored version for {location}: {reason}")]
    #[diagnostic(
        code(versioning::invalid_version),
        help("The object was written without a valid version stamp. Force a write to repair it")
    )]
    InvalidVersion { location: String, reason: String },

    /// The reader already holds the stored version
    #[error("Not modified since {version}")]
    #[diagnostic(code(versioning::not_modified))]
    NotModified { version: VersionToken },

    /// The caller's version does not fit the stored one
    #[error("Version conflict: stored {stored}, requested {requested}")]
    #[diagnostic(
        code(versioning::version_conflict),
        help("Fetch the latest version before writing, or force the write")
    )]
    VersionConflict {
        stored: VersionToken,
        requested: VersionToken,
    },

    /// Writing content to the caller's sink failed
    #[error("Failed to write content: {message}")]
    #[diagnostic(code(versioning::sink_error))]
    SinkError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Backend failure
    #[error("Storage error: {0}")]
    #[diagnostic(
        code(versioning::storage_error),
        help("Check the underlying storage system")
    )]
    StorageError(StorageError),
}

/// Result type for versioning operations
pub type Result<T> = std::result::Result<T, VersioningError>;

/// Coarse classification of a versioning error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidVersion,
    NotModified,
    VersionConflict,
    Transport,
}

impl VersioningError {
    /// Create a NotFound error
    pub fn not_found(location: impl Into<String>) -> Self {
        Self::NotFound {
            location: location.into(),
        }
    }

    /// Create an InvalidVersion error
    pub fn invalid_version(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersion {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotModified error
    pub fn not_modified(version: VersionToken) -> Self {
        Self::NotModified { version }
    }

    /// Create a VersionConflict error
    pub fn version_conflict(stored: VersionToken, requested: VersionToken) -> Self {
        Self::VersionConflict { stored, requested }
    }

    /// Create a SinkError
    pub fn sink_error(source: std::io::Error) -> Self {
        Self::SinkError {
            message: source.to_string(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidVersion { .. } => ErrorKind::InvalidVersion,
            Self::NotModified { .. } => ErrorKind::NotModified,
            Self::VersionConflict { .. } => ErrorKind::VersionConflict,
            Self::SinkError { .. } | Self::StorageError(_) => ErrorKind::Transport,
        }
    }
}

impl From<StorageError> for VersioningError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ObjectNotFound { bucket, key } => {
                Self::not_found(format!("{}/{}", bucket, key))
            }
            other => Self::StorageError(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_such_key_becomes_not_found() {
        let err: VersioningError = StorageError::object_not_found("notes", "todo.md").into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("notes/todo.md"));
    }

    #[test]
    fn test_other_storage_errors_are_transport() {
        let err: VersioningError = StorageError::transaction_error("aborted").into();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err = VersioningError::sink_error(std::io::Error::other("broken pipe"));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_kinds_are_distinct() {
        let t = VersionToken::zero();
        assert_eq!(
            VersioningError::invalid_version("notes/todo.md", "missing").kind(),
            ErrorKind::InvalidVersion
        );
        assert_eq!(VersioningError::not_modified(t).kind(), ErrorKind::NotModified);
        assert_eq!(
            VersioningError::version_conflict(t, t).kind(),
            ErrorKind::VersionConflict
        );
    }
}
