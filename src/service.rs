//! Request-level operations over the four storage roots.
//!
//! [`ImageService`] is what an outer layer (the CLI here, an HTTP router
//! elsewhere) calls into. Each operation maps to one request:
//!
//! | Operation | Writes to | Failure statuses |
//! |---|---|---|
//! | [`upload`](ImageService::upload) | `original/`, `resized/` | 400 oversized batch, 500 storage |
//! | [`check_brightness`](ImageService::check_brightness) | `brightness_pass/` or `brightness_fail/` | 400 undecodable, 500 storage |
//! | [`list`](ImageService::list) | nothing | 500 storage |
//! | [`fetch`](ImageService::fetch) | nothing | 404 unknown name, 500 storage |
//!
//! Errors carry the status an HTTP layer would answer with via
//! [`ServiceError::status_code`].

use crate::brightness::classify;
use crate::config::ServiceConfig;
use crate::imaging::{DerivativeConfig, ImageBackend};
use crate::ingest::{IngestError, IngestTargets, IngestedImage, ingest_batch};
use crate::naming::stored_filename;
use crate::storage::{DirStorage, MemoryStorage, StorageError, StorageRoot, retrieval_path};
use crate::types::UploadPart;
use image::ImageFormat;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Content type reported for files whose extension names no known image format.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Too many files: {count} submitted, at most {max} allowed")]
    BatchTooLarge { count: usize, max: usize },
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// HTTP status an outer layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::BatchTooLarge { .. } | ServiceError::InvalidImage(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Storage(_) => 500,
        }
    }
}

impl From<IngestError> for ServiceError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::BatchTooLarge { count, max } => ServiceError::BatchTooLarge { count, max },
            IngestError::Storage(e) => ServiceError::Storage(e),
        }
    }
}

// ============================================================================
// Roots and layout
// ============================================================================

/// One of the four storage roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    Original,
    Resized,
    Pass,
    Fail,
}

impl RootKind {
    pub const ALL: [RootKind; 4] = [
        RootKind::Original,
        RootKind::Resized,
        RootKind::Pass,
        RootKind::Fail,
    ];

    /// Directory name under the storage base, also the retrieval path segment.
    pub fn dir_name(self) -> &'static str {
        match self {
            RootKind::Original => "original",
            RootKind::Resized => "resized",
            RootKind::Pass => "brightness_pass",
            RootKind::Fail => "brightness_fail",
        }
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RootKind::Original => "original",
            RootKind::Resized => "resized",
            RootKind::Pass => "pass",
            RootKind::Fail => "fail",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown root {0:?} (expected original, resized, pass or fail)")]
pub struct ParseRootKindError(String);

impl FromStr for RootKind {
    type Err = ParseRootKindError;

    /// Accepts the short CLI names and the directory names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "original" => Ok(RootKind::Original),
            "resized" => Ok(RootKind::Resized),
            "pass" | "brightness_pass" => Ok(RootKind::Pass),
            "fail" | "brightness_fail" => Ok(RootKind::Fail),
            _ => Err(ParseRootKindError(s.to_string())),
        }
    }
}

/// The four roots a service works on.
pub struct Layout<S> {
    pub original: S,
    pub resized: S,
    pub pass: S,
    pub fail: S,
}

impl<S> Layout<S> {
    pub fn root(&self, kind: RootKind) -> &S {
        match kind {
            RootKind::Original => &self.original,
            RootKind::Resized => &self.resized,
            RootKind::Pass => &self.pass,
            RootKind::Fail => &self.fail,
        }
    }
}

impl Layout<DirStorage> {
    /// Directory roots under `base`. Nothing is created until first write.
    pub fn on_disk(base: &Path) -> Self {
        Self {
            original: DirStorage::new(base, RootKind::Original.dir_name()),
            resized: DirStorage::new(base, RootKind::Resized.dir_name()),
            pass: DirStorage::new(base, RootKind::Pass.dir_name()),
            fail: DirStorage::new(base, RootKind::Fail.dir_name()),
        }
    }

    /// Create all four directories up front.
    pub fn create_all(&self) -> Result<(), StorageError> {
        for kind in RootKind::ALL {
            self.root(kind).ensure_exists()?;
        }
        Ok(())
    }
}

impl Layout<MemoryStorage> {
    pub fn in_memory() -> Self {
        Self {
            original: MemoryStorage::new(RootKind::Original.dir_name()),
            resized: MemoryStorage::new(RootKind::Resized.dir_name()),
            pass: MemoryStorage::new(RootKind::Pass.dir_name()),
            fail: MemoryStorage::new(RootKind::Fail.dir_name()),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Response to an upload request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResponse {
    /// Number of images stored (skipped parts are not counted).
    pub count: usize,
    pub files: Vec<IngestedImage>,
}

/// Response to a brightness check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrightnessReport {
    /// Generated name of the stored copy.
    pub filename: String,
    /// Name the caller uploaded the file under.
    pub original_name: String,
    pub score: f64,
    pub passed: bool,
    /// Retrieval path of the stored copy in the pass or fail root.
    pub url: String,
}

/// A stored file ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// MIME type implied by a filename's extension.
pub fn content_type_for(filename: &str) -> &'static str {
    ImageFormat::from_path(filename)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

// ============================================================================
// Service
// ============================================================================

/// Image intake over a [`Layout`] of storage roots and an [`ImageBackend`].
pub struct ImageService<S: StorageRoot, B: ImageBackend> {
    layout: Layout<S>,
    backend: B,
    derivative: DerivativeConfig,
    url_prefix: String,
}

impl<S: StorageRoot, B: ImageBackend> ImageService<S, B> {
    pub fn new(layout: Layout<S>, backend: B, config: &ServiceConfig) -> Self {
        Self {
            layout,
            backend,
            derivative: config.resize.derivative_config(),
            url_prefix: config.storage.url_prefix.clone(),
        }
    }

    pub fn layout(&self) -> &Layout<S> {
        &self.layout
    }

    /// Store every image part of a request along with its derivative.
    pub fn upload(&self, parts: Vec<UploadPart>) -> Result<UploadResponse, ServiceError> {
        let targets = IngestTargets {
            originals: &self.layout.original,
            resized: &self.layout.resized,
            url_prefix: &self.url_prefix,
        };
        let files = ingest_batch(&parts, &targets, &self.backend, &self.derivative)?;
        info!(
            submitted = parts.len(),
            stored = files.len(),
            "Upload complete"
        );
        Ok(UploadResponse {
            count: files.len(),
            files,
        })
    }

    /// Classify one image and file it under pass or fail.
    ///
    /// The blob is decoded before anything is written, so an undecodable
    /// upload leaves both roots untouched.
    pub fn check_brightness(&self, part: UploadPart) -> Result<BrightnessReport, ServiceError> {
        let image = self
            .backend
            .decode(&part.data)
            .map_err(|e| ServiceError::InvalidImage(e.to_string()))?;
        let classification = classify(&image);

        let root = if classification.passed {
            &self.layout.pass
        } else {
            &self.layout.fail
        };

        let filename = stored_filename(&part.original_name);
        root.write(&filename, &part.data)?;
        info!(
            filename = %filename,
            score = classification.score,
            passed = classification.passed,
            "Brightness checked"
        );

        Ok(BrightnessReport {
            url: retrieval_path(&self.url_prefix, root.name(), &filename),
            filename,
            original_name: part.original_name,
            score: classification.score,
            passed: classification.passed,
        })
    }

    /// Retrieval paths of every file in a root, sorted.
    pub fn list(&self, kind: RootKind) -> Result<Vec<String>, ServiceError> {
        let root = self.layout.root(kind);
        let names = root.list()?;
        debug!(root = %kind, files = names.len(), "Listed root");
        Ok(names
            .iter()
            .map(|name| retrieval_path(&self.url_prefix, root.name(), name))
            .collect())
    }

    /// Read one stored file.
    ///
    /// Any name the root does not hold, including names that could never be
    /// stored, is a `NotFound`.
    pub fn fetch(&self, kind: RootKind, filename: &str) -> Result<FetchedImage, ServiceError> {
        let bytes = match self.layout.root(kind).read(filename) {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_) | StorageError::InvalidName(_)) => {
                debug!(root = %kind, filename, "Fetch of unknown file");
                return Err(ServiceError::NotFound(format!("{kind}/{filename}")));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(FetchedImage {
            filename: filename.to_string(),
            content_type: content_type_for(filename).to_string(),
            bytes,
        })
    }
}
