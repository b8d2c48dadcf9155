use crate::{decide_read, decide_write, ReadDecision, Result, VersioningError, WriteDecision};
use bytes::Bytes;
use notesync_core::{ObjectLocation, VersionToken, VERSION_METADATA_KEY};
use notesync_storage::{ObjectBackend, ObjectMetadata, PutObject};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Version-aware access to the single synced document
///
/// Every call re-derives the document state from the backend; nothing is
/// cached between calls. `safe_put` reads the stored version and then writes,
/// so two writers presenting the same stale version can both pass the check
/// and the later write wins.
pub struct VersionedObjectStore {
    backend: Arc<dyn ObjectBackend>,
    location: ObjectLocation,
}

impl VersionedObjectStore {
    /// Create a store for the object at `location`
    pub fn new(backend: Arc<dyn ObjectBackend>, location: ObjectLocation) -> Self {
        info!("Initializing VersionedObjectStore for {}", location);
        Self { backend, location }
    }

    /// Location of the managed object
    pub fn location(&self) -> &ObjectLocation {
        &self.location
    }

    /// Stored version, without transferring content
    pub fn current_version(&self) -> Result<VersionToken> {
        let metadata = self.backend.head(&self.location)?;
        self.stored_version(&metadata)
    }

    /// Conditional read
    ///
    /// Writes the content to `sink` only when the stored version is strictly
    /// newer than `client_version`, and returns the stored version. Equal
    /// versions fail with `NotModified`, a newer client version with
    /// `VersionConflict`; nothing reaches the sink in either case.
    pub fn get<W: Write + ?Sized>(
        &self,
        client_version: VersionToken,
        sink: &mut W,
    ) -> Result<VersionToken> {
        debug!("Get {} since {}", self.location, client_version);

        let object = self.backend.get(&self.location)?;
        let stored = self.stored_version(&object.metadata)?;

        match decide_read(stored, client_version) {
            ReadDecision::Send => {
                sink.write_all(&object.body)
                    .map_err(VersioningError::sink_error)?;
                debug!("Sent {} bytes at version {}", object.body.len(), stored);
                Ok(stored)
            }
            ReadDecision::NotModified => {
                debug!("Client already has version {}", stored);
                Err(VersioningError::not_modified(stored))
            }
            ReadDecision::ReaderAhead => {
                warn!(
                    "Client version {} is newer than stored version {}",
                    client_version, stored
                );
                Err(VersioningError::version_conflict(stored, client_version))
            }
        }
    }

    /// Unconditional read of content and version
    pub fn view(&self) -> Result<(VersionToken, Bytes)> {
        let object = self.backend.get(&self.location)?;
        let stored = self.stored_version(&object.metadata)?;
        Ok((stored, object.body))
    }

    /// Conditional write
    ///
    /// Replaces the content and stamps it with `new_version` if that is
    /// strictly after the stored version, or if nothing is stored yet.
    /// Otherwise fails with `VersionConflict` and leaves storage untouched.
    pub fn safe_put(
        &self,
        new_version: VersionToken,
        content: impl Into<Bytes>,
    ) -> Result<VersionToken> {
        let stored = match self.current_version() {
            Ok(version) => Some(version),
            Err(VersioningError::NotFound { .. }) => {
                debug!("{} does not exist yet, creating it", self.location);
                None
            }
            Err(e) => return Err(e),
        };

        match decide_write(stored, new_version) {
            WriteDecision::Accept => self.write(new_version, content.into()),
            WriteDecision::Reject => {
                let stored = stored.unwrap_or_else(VersionToken::zero);
                warn!(
                    "Version conflict writing {}: stored {} is not older than {}",
                    self.location, stored, new_version
                );
                Err(VersioningError::version_conflict(stored, new_version))
            }
        }
    }

    /// Unconditional write stamped with the current time
    pub fn overwrite(&self, content: impl Into<Bytes>) -> Result<VersionToken> {
        info!("Overwriting {} without version check", self.location);
        self.write(VersionToken::now(), content.into())
    }

    fn write(&self, version: VersionToken, content: Bytes) -> Result<VersionToken> {
        let size = content.len();
        let put = PutObject::new(content).metadata(VERSION_METADATA_KEY, version.to_header());

        self.backend.put(&self.location, put)?;

        info!("Stored {} ({} bytes) at version {}", self.location, size, version);
        Ok(version)
    }

    fn stored_version(&self, metadata: &ObjectMetadata) -> Result<VersionToken> {
        let raw = metadata.get(VERSION_METADATA_KEY).ok_or_else(|| {
            warn!("Missing stored version for {}", self.location);
            VersioningError::invalid_version(self.location.to_string(), "version metadata missing")
        })?;

        VersionToken::parse(raw).map_err(|e| {
            warn!("Invalid stored version for {}: {}", self.location, e);
            VersioningError::invalid_version(self.location.to_string(), e.to_string())
        })
    }
}
