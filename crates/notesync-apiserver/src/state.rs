use notesync_core::SIZE_LIMIT;
use notesync_versioning::VersionedObjectStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The versioned document store
    pub store: Arc<VersionedObjectStore>,

    /// Shared secret required on every document route (None = open)
    pub auth_token: Option<String>,

    /// Writes must be strictly smaller than this many bytes
    pub size_limit: u64,
}

impl AppState {
    /// Create a new AppState with no auth and the default size ceiling
    pub fn new(store: Arc<VersionedObjectStore>) -> Self {
        Self {
            store,
            auth_token: None,
            size_limit: SIZE_LIMIT,
        }
    }

    /// Require `token` on every document route
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Override the write size ceiling
    pub fn with_size_limit(mut self, size_limit: u64) -> Self {
        self.size_limit = size_limit;
        self
    }
}
