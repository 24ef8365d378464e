//! Storage roots: flat namespaces of opaque filenames.
//!
//! A storage root is the only persistent state this crate has. There is no
//! manifest or index file: listing a root *is* the index. Two implementations
//! ship with the crate:
//!
//! | Implementation | Backing | Used by |
//! |---|---|---|
//! | [`DirStorage`] | one directory on disk | the CLI and any real deployment |
//! | [`MemoryStorage`] | a `Mutex<BTreeMap>` | unit tests that should not touch disk |
//!
//! Filenames handed to a root must be a single plain path component. Names
//! containing separators, `.`/`..`, or NUL are rejected with
//! [`StorageError::InvalidName`] before any I/O happens, so a root can never
//! be coaxed into reading or writing outside itself.

mod dir;
mod memory;

pub use dir::DirStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Invalid filename: {0:?}")]
    InvalidName(String),
}

/// A flat namespace of files addressed by opaque names.
///
/// Implementations must be `Send + Sync`: a batch writes into the same roots
/// from several rayon workers at once.
pub trait StorageRoot: Send + Sync {
    /// Short name of the root, used as the directory segment in retrieval paths.
    fn name(&self) -> &str;

    /// Store `data` under `filename`, replacing any previous content.
    fn write(&self, filename: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Read the full content stored under `filename`.
    fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError>;

    /// All filenames currently stored, sorted.
    fn list(&self) -> Result<Vec<String>, StorageError>;

    /// Whether `filename` is present. Invalid names are never present.
    fn contains(&self, filename: &str) -> Result<bool, StorageError> {
        match self.read(filename) {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_) | StorageError::InvalidName(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Path a caller uses to fetch `filename` from the root named `root`.
///
/// `retrieval_path("/images", "original", "ab12.jpg")` → `/images/original/ab12.jpg`
pub fn retrieval_path(url_prefix: &str, root: &str, filename: &str) -> String {
    format!("{}/{}/{}", url_prefix.trim_end_matches('/'), root, filename)
}

/// Reject anything that is not a single, plain path component.
pub fn validate_filename(filename: &str) -> Result<(), StorageError> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidName(filename.to_string()));
    }
    Ok(())
}
