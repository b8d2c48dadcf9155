use crate::{Result, StorageError};
use bytes::Bytes;
use notesync_core::{ObjectLocation, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata stored alongside an object's content
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// MIME type of the content
    pub content_type: String,
    /// Size of the content in bytes
    pub content_length: u64,
    /// User-defined metadata fields
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ObjectMetadata {
    /// Look up a user metadata field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.metadata.get(name).map(String::as_str)
    }
}

/// Content plus metadata, as returned by a full read
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub body: Bytes,
    pub metadata: ObjectMetadata,
}

/// A full-content write request
#[derive(Debug, Clone)]
pub struct PutObject {
    /// New content
    pub body: Bytes,
    /// Declared content length; must match `body`
    pub content_length: u64,
    /// MIME type of the content
    pub content_type: String,
    /// User-defined metadata fields
    pub metadata: BTreeMap<String, String>,
}

impl PutObject {
    /// Plain-text write of `body` with no user metadata
    pub fn new(body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self {
            content_length: body.len() as u64,
            body,
            content_type: CONTENT_TYPE.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    /// Set the content type
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Override the declared content length
    pub fn content_length(mut self, content_length: u64) -> Self {
        self.content_length = content_length;
        self
    }

    /// Attach a user metadata field
    pub fn metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(name.into(), value.into());
        self
    }

    /// Check the declared length against the body
    pub fn validate(&self) -> Result<()> {
        let actual = self.body.len() as u64;
        if self.content_length != actual {
            return Err(StorageError::content_length_mismatch(
                self.content_length,
                actual,
            ));
        }
        Ok(())
    }

    /// Split into the body and the metadata record to persist
    pub(crate) fn into_parts(self) -> (Bytes, ObjectMetadata) {
        let metadata = ObjectMetadata {
            content_type: self.content_type,
            content_length: self.content_length,
            metadata: self.metadata,
        };
        (self.body, metadata)
    }
}

/// Keyed blob storage with per-object metadata
///
/// Implementations report a missing object as
/// [`StorageError::ObjectNotFound`] from every operation that reads, and
/// replace content and metadata together on `put`.
pub trait ObjectBackend: Send + Sync {
    /// Fetch metadata without content
    fn head(&self, location: &ObjectLocation) -> Result<ObjectMetadata>;

    /// Fetch content and metadata
    fn get(&self, location: &ObjectLocation) -> Result<ObjectData>;

    /// Replace content and metadata
    fn put(&self, location: &ObjectLocation, object: PutObject) -> Result<()>;
}
