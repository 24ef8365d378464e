//! In-memory storage root.

use super::{StorageError, StorageRoot, validate_filename};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A storage root that keeps everything in a map.
///
/// Uses `Mutex` (not `RefCell`) so it is `Sync` and works with rayon workers.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    name: String,
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            files: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-written.
    fn files(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageRoot for MemoryStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, filename: &str, data: &[u8]) -> Result<(), StorageError> {
        validate_filename(filename)?;
        self.files().insert(filename.to_string(), data.to_vec());
        Ok(())
    }

    fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        validate_filename(filename)?;
        self.files()
            .get(filename)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(filename.to_string()))
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.files().keys().cloned().collect())
    }
}
