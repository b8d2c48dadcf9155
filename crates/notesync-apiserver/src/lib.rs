//! Notesync API Server - HTTP surface for the synced document
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Conditional GET, HEAD and versioned/forced PUT on the document
//! - Markdown HTML view of the document
//! - Shared-secret authentication

pub mod auth;
pub mod error;
pub mod handlers;
pub mod response;
pub mod server;
pub mod state;
pub mod validation;

// Re-export commonly used types
pub use error::{ApiError, Result};
pub use server::{ApiServer, Config};
pub use state::AppState;
