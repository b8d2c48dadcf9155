use crate::{ObjectBackend, ObjectData, ObjectMetadata, PutObject, Result, StorageError};
use bytes::Bytes;
use notesync_core::ObjectLocation;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

// Table definitions
const OBJECTS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("objects");
const METADATA_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("object_metadata");

/// redb-based object store
///
/// One database file holds any number of buckets; objects are keyed by
/// `{bucket}/{key}`. Content and metadata live in separate tables so `head`
/// never touches the content, and `put` replaces both in one write
/// transaction.
pub struct RedbObjectStore {
    db: Arc<Database>,
}

impl RedbObjectStore {
    /// Open (or create) the database at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Opening redb object store at: {}", path.as_ref().display());

        let db = Database::create(path.as_ref()).map_err(|e| {
            StorageError::database_error(
                format!("Failed to create database: {}", e),
                Some(Box::new(e)),
            )
        })?;

        // Create tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(OBJECTS_TABLE)?;
            let _ = write_txn.open_table(METADATA_TABLE)?;
        }
        write_txn.commit()?;

        info!("redb object store initialized successfully");

        Ok(Self { db: Arc::new(db) })
    }
}

impl ObjectBackend for RedbObjectStore {
    fn head(&self, location: &ObjectLocation) -> Result<ObjectMetadata> {
        debug!("Head object: {}", location);

        let storage_key = location.storage_key();
        let read_txn = self.db.begin_read()?;
        let objects = read_txn.open_table(OBJECTS_TABLE)?;
        let metadata_table = read_txn.open_table(METADATA_TABLE)?;

        // Existence is decided by the content table, as in `get`
        let content_length = match objects.get(storage_key.as_bytes())? {
            Some(value) => value.value().len() as u64,
            None => {
                return Err(StorageError::object_not_found(
                    &location.bucket,
                    &location.key,
                ))
            }
        };

        match metadata_table.get(storage_key.as_bytes())? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(bare_metadata(location, content_length)),
        }
    }

    fn get(&self, location: &ObjectLocation) -> Result<ObjectData> {
        debug!("Get object: {}", location);

        let storage_key = location.storage_key();
        let read_txn = self.db.begin_read()?;
        let objects = read_txn.open_table(OBJECTS_TABLE)?;
        let metadata_table = read_txn.open_table(METADATA_TABLE)?;

        let body = match objects.get(storage_key.as_bytes())? {
            Some(value) => Bytes::from(value.value().to_vec()),
            None => {
                return Err(StorageError::object_not_found(
                    &location.bucket,
                    &location.key,
                ))
            }
        };

        let metadata = match metadata_table.get(storage_key.as_bytes())? {
            Some(value) => serde_json::from_slice(value.value())?,
            None => bare_metadata(location, body.len() as u64),
        };

        Ok(ObjectData { body, metadata })
    }

    fn put(&self, location: &ObjectLocation, object: PutObject) -> Result<()> {
        object.validate()?;
        debug!(
            "Put object: {} ({} bytes)",
            location, object.content_length
        );

        let storage_key = location.storage_key();
        let (body, metadata) = object.into_parts();
        let metadata_json = serde_json::to_vec(&metadata)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut objects = write_txn.open_table(OBJECTS_TABLE)?;
            objects.insert(storage_key.as_bytes(), body.as_ref())?;

            let mut metadata_table = write_txn.open_table(METADATA_TABLE)?;
            metadata_table.insert(storage_key.as_bytes(), metadata_json.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }
}

/// Metadata for content written without a metadata record
///
/// Reported bare so the caller decides what a missing version means.
fn bare_metadata(location: &ObjectLocation, content_length: u64) -> ObjectMetadata {
    warn!("Object {} has no metadata record", location);
    ObjectMetadata {
        content_length,
        ..Default::default()
    }
}
