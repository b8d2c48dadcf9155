use crate::{ObjectBackend, ObjectData, ObjectMetadata, PutObject, Result, StorageError};
use bytes::Bytes;
use notesync_core::ObjectLocation;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// In-memory object store
///
/// Holds objects in a map for the lifetime of the process. Used by tests and
/// by `serve --memory` for throwaway servers.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, (Bytes, ObjectMetadata)>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects across all buckets
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl ObjectBackend for MemoryObjectStore {
    fn head(&self, location: &ObjectLocation) -> Result<ObjectMetadata> {
        debug!("Memory: head object {}", location);

        self.objects
            .read()
            .get(&location.storage_key())
            .map(|(_, metadata)| metadata.clone())
            .ok_or_else(|| StorageError::object_not_found(&location.bucket, &location.key))
    }

    fn get(&self, location: &ObjectLocation) -> Result<ObjectData> {
        debug!("Memory: get object {}", location);

        self.objects
            .read()
            .get(&location.storage_key())
            .map(|(body, metadata)| ObjectData {
                body: body.clone(),
                metadata: metadata.clone(),
            })
            .ok_or_else(|| StorageError::object_not_found(&location.bucket, &location.key))
    }

    fn put(&self, location: &ObjectLocation, object: PutObject) -> Result<()> {
        object.validate()?;
        debug!(
            "Memory: put object {} ({} bytes)",
            location, object.content_length
        );

        let (body, metadata) = object.into_parts();
        self.objects
            .write()
            .insert(location.storage_key(), (body, metadata));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_operations() {
        let store = MemoryObjectStore::new();
        let location = ObjectLocation::new("notes", "todo.md").unwrap();
        assert!(store.is_empty());

        assert!(store.head(&location).unwrap_err().is_not_found());
        assert!(store.get(&location).unwrap_err().is_not_found());

        store
            .put(&location, PutObject::new("hola").metadata("version", "v1"))
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&location).unwrap().body, Bytes::from("hola"));
        assert_eq!(store.head(&location).unwrap().get("version"), Some("v1"));
    }

    #[test]
    fn test_memory_store_rejects_bad_length() {
        let store = MemoryObjectStore::new();
        let location = ObjectLocation::new("notes", "todo.md").unwrap();

        assert!(store
            .put(&location, PutObject::new("hola").content_length(0))
            .is_err());
        assert!(store.is_empty());
    }
}
