use crate::{ClientError, Result};
use notesync_core::VersionToken;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The local copy of the document
///
/// Its version is the file's modification time, truncated to whole seconds
/// like every other version.
#[derive(Debug, Clone)]
pub struct LocalDocument {
    path: PathBuf,
}

impl LocalDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time of the file, or None when it does not exist
    pub fn version(&self) -> Result<Option<VersionToken>> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let modified = metadata.modified().map_err(|e| self.io_error(e))?;
        Ok(Some(VersionToken::from(modified)))
    }

    /// Content and version of the file
    pub fn read(&self) -> Result<(VersionToken, Vec<u8>)> {
        let body = fs::read(&self.path).map_err(|e| self.io_error(e))?;
        let version = self
            .version()?
            .ok_or_else(|| self.io_error(ErrorKind::NotFound.into()))?;
        Ok((version, body))
    }

    /// Replace the file and stamp it with `version`
    pub fn write(&self, body: &[u8], version: VersionToken) -> Result<()> {
        fs::write(&self.path, body).map_err(|e| self.io_error(e))?;
        self.set_version(version)
    }

    /// Set the modification time to `version`
    pub fn set_version(&self, version: VersionToken) -> Result<()> {
        let file = File::options()
            .write(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.set_modified(version.to_system_time())
            .map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> ClientError {
        ClientError::io(self.path.display().to_string(), source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_has_no_version() {
        let dir = tempdir().unwrap();
        let doc = LocalDocument::new(dir.path().join("todo.md"));

        assert_eq!(doc.version().unwrap(), None);
        assert!(matches!(doc.read().unwrap_err(), ClientError::Io { .. }));
    }

    #[test]
    fn test_write_stamps_version() {
        let dir = tempdir().unwrap();
        let doc = LocalDocument::new(dir.path().join("todo.md"));
        let version = VersionToken::from_unix_seconds(1_700_000_000).unwrap();

        doc.write(b"- [ ] milk", version).unwrap();

        assert_eq!(doc.version().unwrap(), Some(version));
        let (read_version, body) = doc.read().unwrap();
        assert_eq!(read_version, version);
        assert_eq!(body, b"- [ ] milk");
    }

    #[test]
    fn test_set_version_keeps_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("todo.md");
        fs::write(&path, "hola").unwrap();

        let doc = LocalDocument::new(&path);
        let version = VersionToken::from_unix_seconds(1_136_214_245).unwrap();
        doc.set_version(version).unwrap();

        assert_eq!(doc.version().unwrap(), Some(version));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hola");
    }
}
