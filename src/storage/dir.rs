//! Directory-backed storage root.

use super::{StorageError, StorageRoot, validate_filename};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A storage root backed by a single directory.
///
/// The directory is created lazily on the first write with `create_dir_all`,
/// which succeeds when another request created it concurrently. Listing and
/// reading a directory that does not exist yet behave like an empty root.
#[derive(Debug, Clone)]
pub struct DirStorage {
    name: String,
    path: PathBuf,
}

impl DirStorage {
    /// Root named `name` living at `base/name`.
    pub fn new(base: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: base.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory if it is missing.
    pub fn ensure_exists(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.path)?;
        Ok(())
    }
}

impl StorageRoot for DirStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, filename: &str, data: &[u8]) -> Result<(), StorageError> {
        validate_filename(filename)?;
        self.ensure_exists()?;
        fs::write(self.path.join(filename), data)?;
        Ok(())
    }

    fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        validate_filename(filename)?;
        let path = self.path.join(filename);
        if !path.is_file() {
            return Err(StorageError::NotFound(filename.to_string()));
        }
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn contains(&self, filename: &str) -> Result<bool, StorageError> {
        if validate_filename(filename).is_err() {
            return Ok(false);
        }
        Ok(self.path.join(filename).is_file())
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();

        names.sort();
        Ok(names)
    }
}
