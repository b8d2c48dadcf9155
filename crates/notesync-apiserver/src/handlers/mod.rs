pub mod document;
pub mod view;

// Re-export handler functions
pub use document::*;
pub use view::*;

use crate::{ApiError, AppState, Result};
use notesync_versioning::VersionedObjectStore;
use std::sync::Arc;

/// Run a store call on the blocking pool
///
/// Backend calls do synchronous I/O (redb commits fsync), so they stay off
/// the async worker threads.
pub(crate) async fn with_store<T, F>(state: &AppState, f: F) -> Result<T>
where
    F: FnOnce(&VersionedObjectStore) -> notesync_versioning::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store: Arc<VersionedObjectStore> = state.store.clone();
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| ApiError::Internal(format!("Store task failed: {}", e)))?
        .map_err(ApiError::from)
}
