// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use notesync_core::{CoreError, VersionToken};
use thiserror::Error;

/// Client error type
#[derive(Error, Debug, Diagnostic)]
pub enum ClientError {
    /// The request never produced a response
    #[error("HTTP request failed: {message}")]
    #[diagnostic(
        code(client::http_error),
        help("Check that the server address is correct and the server is running")
    )]
    Http { message: String },

    /// The server has no document yet
    #[error("The remote document does not exist")]
    #[diagnostic(
        code(client::not_found),
        help("Push a local file to create it")
    )]
    NotFound,

    /// The server rejected the shared secret
    #[error("Unauthorized: {message}")]
    #[diagnostic(
        code(client::unauthorized),
        help("Set NOTESYNC_TOKEN to the token the server was started with")
    )]
    Unauthorized { message: String },

    /// The server refused the write or read because of versions
    #[error("Version conflict: {message}")]
    #[diagnostic(
        code(client::conflict),
        help("Pull the latest version first, or push with --force to overwrite")
    )]
    Conflict { message: String },

    /// The local file changed after the remote version
    #[error("Local file (version {local}) is newer than the remote one (version {remote})")]
    #[diagnostic(
        code(client::local_ahead),
        help("Push the local file, or remove it and pull again")
    )]
    LocalAhead {
        local: VersionToken,
        remote: VersionToken,
    },

    /// Any other non-success status
    #[error("Unexpected response {status}: {body}")]
    #[diagnostic(code(client::unexpected_status))]
    UnexpectedStatus { status: u16, body: String },

    /// A response did not carry a usable version header
    #[error("Invalid version in response: {0}")]
    #[diagnostic(code(client::invalid_version))]
    InvalidVersion(#[from] CoreError),

    /// Local file access failed
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(code(client::io_error))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The editor could not be started or exited unsuccessfully
    #[error("Editor failed: {message}")]
    #[diagnostic(
        code(client::editor_error),
        help("Set EDITOR or pass --editor with a program that takes a file path")
    )]
    Editor { message: String },
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Create an Http error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    /// Create an Io error
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an Editor error
    pub fn editor(message: impl Into<String>) -> Self {
        Self::Editor {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::http(err.to_string())
    }
}
