// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for Notesync operations
#[derive(Error, Debug, Diagnostic)]
pub enum CoreError {
    /// A version string could not be parsed
    #[error("Invalid version '{value}': {reason}")]
    #[diagnostic(
        code(notesync::invalid_version_format),
        help("Versions use the HTTP date format, e.g. 'Mon, 02 Jan 2006 15:04:05 GMT'")
    )]
    InvalidVersionFormat {
        #[allow(unused)]
        value: String,
        #[allow(unused)]
        reason: String,
    },

    /// Bucket or key is unusable
    #[error("Invalid object location: {reason}")]
    #[diagnostic(
        code(notesync::invalid_location),
        help("Both the bucket and the key must be non-empty and must not contain '/' at the edges")
    )]
    InvalidLocation {
        #[allow(unused)]
        reason: String,
    },
}

/// Result type alias for Notesync core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create an InvalidVersionFormat error
    pub fn invalid_version_format(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersionFormat {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidLocation error
    pub fn invalid_location(reason: impl Into<String>) -> Self {
        Self::InvalidLocation {
            reason: reason.into(),
        }
    }
}
