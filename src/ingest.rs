//! Upload ingestion: store the original, derive a resized copy.
//!
//! For every part of a batch that declares an `image/*` content type:
//!
//! ```text
//! 1. name      caller filename  →  <uuid hex>.<ext>        (naming)
//! 2. original  blob             →  original/<name>         (verbatim)
//! 3. derive    blob             →  RGB8 → resize → encode  (imaging)
//! 4. resized   derivative       →  resized/<name>
//! ```
//!
//! A failing step 3 or 4 does not fail the file or the batch. The original
//! stays where it is and the result carries
//! [`IngestOutcome::DerivativeMissing`], so callers can tell a fully stored
//! image from one whose resized copy does not exist. A failing step 2 is a
//! storage fault and fails the request.
//!
//! Parts with another content type are skipped without a trace in the result.
//! A batch of more than [`MAX_BATCH_FILES`] parts is rejected before anything
//! is written.

use crate::imaging::{DerivativeConfig, ImageBackend, create_derivative};
use crate::naming::stored_filename;
use crate::storage::{StorageError, StorageRoot, retrieval_path};
use crate::types::UploadPart;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Largest number of files accepted in one request.
pub const MAX_BATCH_FILES: usize = 20;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Too many files: {count} submitted, at most {max} allowed")]
    BatchTooLarge { count: usize, max: usize },
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Where a stored image can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImageRecord {
    /// Generated filename, shared by the original and the derivative.
    pub filename: String,
    /// Retrieval path of the original.
    #[serde(rename = "url")]
    pub original_url: String,
    /// Retrieval path of the derivative, absent when it could not be produced.
    #[serde(rename = "resized")]
    pub resized_url: Option<String>,
}

/// Whether both files of a record were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    Complete,
    DerivativeMissing { reason: String },
}

/// Result of ingesting one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestedImage {
    #[serde(flatten)]
    pub record: StoredImageRecord,
    pub outcome: IngestOutcome,
}

impl IngestedImage {
    pub fn is_complete(&self) -> bool {
        self.outcome == IngestOutcome::Complete
    }
}

/// The two roots an upload lands in, plus how they are addressed.
pub struct IngestTargets<'a, S: StorageRoot> {
    pub originals: &'a S,
    pub resized: &'a S,
    pub url_prefix: &'a str,
}

/// Ingest one uploaded file.
///
/// Returns `Ok(None)` when the part is not an image and was skipped.
pub fn ingest<S: StorageRoot>(
    part: &UploadPart,
    targets: &IngestTargets<'_, S>,
    backend: &impl ImageBackend,
    config: &DerivativeConfig,
) -> Result<Option<IngestedImage>, IngestError> {
    if !part.is_image() {
        debug!(
            original_name = %part.original_name,
            content_type = %part.content_type,
            "Skipping non-image upload"
        );
        return Ok(None);
    }

    let filename = stored_filename(&part.original_name);

    targets.originals.write(&filename, &part.data)?;
    info!(filename = %filename, bytes = part.data.len(), "Stored original");

    let original_url = retrieval_path(targets.url_prefix, targets.originals.name(), &filename);

    let outcome = match write_derivative(part, &filename, targets.resized, backend, config) {
        Ok(()) => IngestOutcome::Complete,
        Err(reason) => {
            warn!(filename = %filename, error = %reason, "Resize failed, original kept without derivative");
            IngestOutcome::DerivativeMissing { reason }
        }
    };

    let resized_url = match outcome {
        IngestOutcome::Complete => Some(retrieval_path(
            targets.url_prefix,
            targets.resized.name(),
            &filename,
        )),
        IngestOutcome::DerivativeMissing { .. } => None,
    };

    Ok(Some(IngestedImage {
        record: StoredImageRecord {
            filename,
            original_url,
            resized_url,
        },
        outcome,
    }))
}

/// Produce and store the derivative; any failure becomes a reason string.
fn write_derivative<S: StorageRoot>(
    part: &UploadPart,
    filename: &str,
    resized: &S,
    backend: &impl ImageBackend,
    config: &DerivativeConfig,
) -> Result<(), String> {
    let derivative =
        create_derivative(backend, &part.data, filename, config).map_err(|e| e.to_string())?;
    resized
        .write(filename, &derivative.data)
        .map_err(|e| e.to_string())?;
    debug!(
        filename = %filename,
        width = derivative.dimensions.width,
        height = derivative.dimensions.height,
        "Stored derivative"
    );
    Ok(())
}

/// Ingest a whole request.
///
/// Files are processed in parallel on the rayon pool; results keep the
/// submission order, minus skipped parts.
///
/// A failed original write fails the batch; originals other workers already
/// stored stay in place without a returned record.
pub fn ingest_batch<S: StorageRoot>(
    parts: &[UploadPart],
    targets: &IngestTargets<'_, S>,
    backend: &impl ImageBackend,
    config: &DerivativeConfig,
) -> Result<Vec<IngestedImage>, IngestError> {
    if parts.len() > MAX_BATCH_FILES {
        warn!(count = parts.len(), max = MAX_BATCH_FILES, "Rejecting oversized batch");
        return Err(IngestError::BatchTooLarge {
            count: parts.len(),
            max: MAX_BATCH_FILES,
        });
    }

    let results: Vec<Option<IngestedImage>> = parts
        .par_iter()
        .map(|part| ingest(part, targets, backend, config))
        .collect::<Result<_, _>>()?;

    Ok(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::MockBackend;
    use crate::storage::MemoryStorage;
    use crate::test_helpers::{gray_png_part, jpeg_part, text_part};
    use std::collections::HashSet;

    struct Roots {
        originals: MemoryStorage,
        resized: MemoryStorage,
    }

    impl Roots {
        fn new() -> Self {
            Self {
                originals: MemoryStorage::new("original"),
                resized: MemoryStorage::new("resized"),
            }
        }

        fn targets(&self) -> IngestTargets<'_, MemoryStorage> {
            IngestTargets {
                originals: &self.originals,
                resized: &self.resized,
                url_prefix: "/images",
            }
        }
    }

    #[test]
    fn ingest_stores_original_and_derivative() {
        let roots = Roots::new();
        let part = jpeg_part("holiday.jpg", 64, 48);

        let result = ingest(
            &part,
            &roots.targets(),
            &RustBackend::new(),
            &DerivativeConfig::default(),
        )
        .unwrap()
        .unwrap();

        assert!(result.is_complete());
        let name = &result.record.filename;
        assert!(name.ends_with(".jpg"));
        assert_eq!(result.record.original_url, format!("/images/original/{name}"));
        assert_eq!(
            result.record.resized_url.as_deref(),
            Some(format!("/images/resized/{name}").as_str())
        );
        assert_eq!(roots.originals.read(name).unwrap(), part.data);
        assert!(roots.resized.contains(name).unwrap());
    }

    #[test]
    fn ingest_keeps_caller_extension() {
        let roots = Roots::new();
        let part = gray_png_part("scan.png", 100);

        let result = ingest(
            &part,
            &roots.targets(),
            &RustBackend::new(),
            &DerivativeConfig::default(),
        )
        .unwrap()
        .unwrap();

        assert!(result.record.filename.ends_with(".png"));
        assert!(result.is_complete());
    }

    #[test]
    fn ingest_never_uses_caller_path() {
        let roots = Roots::new();
        let part = jpeg_part("../../etc/cron.d/evil.jpg", 8, 8);

        let result = ingest(&part, &roots.targets(), &MockBackend::new(), &DerivativeConfig::default())
            .unwrap()
            .unwrap();

        assert!(!result.record.filename.contains('/'));
        assert!(!result.record.filename.contains("evil"));
        assert_eq!(roots.originals.len(), 1);
    }

    #[test]
    fn ingest_skips_non_image() {
        let roots = Roots::new();

        let result = ingest(
            &text_part("notes.txt"),
            &roots.targets(),
            &MockBackend::new(),
            &DerivativeConfig::default(),
        )
        .unwrap();

        assert!(result.is_none());
        assert!(roots.originals.is_empty());
        assert!(roots.resized.is_empty());
    }

    #[test]
    fn corrupt_image_keeps_original_without_derivative() {
        let roots = Roots::new();
        let part = UploadPart::new(b"not really a jpeg".to_vec(), "broken.jpg", "image/jpeg");

        let result = ingest(
            &part,
            &roots.targets(),
            &RustBackend::new(),
            &DerivativeConfig::default(),
        )
        .unwrap()
        .unwrap();

        assert!(!result.is_complete());
        assert!(matches!(
            result.outcome,
            IngestOutcome::DerivativeMissing { .. }
        ));
        assert_eq!(result.record.resized_url, None);
        assert!(roots.originals.contains(&result.record.filename).unwrap());
        assert!(roots.resized.is_empty());
    }

    #[test]
    fn backend_failure_is_contained() {
        let roots = Roots::new();
        let backend = MockBackend::failing_resize("unsupported mode");

        let result = ingest(
            &jpeg_part("a.jpg", 8, 8),
            &roots.targets(),
            &backend,
            &DerivativeConfig::default(),
        )
        .unwrap()
        .unwrap();

        match result.outcome {
            IngestOutcome::DerivativeMissing { reason } => {
                assert!(reason.contains("unsupported mode"))
            }
            IngestOutcome::Complete => panic!("expected missing derivative"),
        }
        assert_eq!(roots.originals.len(), 1);
    }

    #[test]
    fn unknown_extension_has_no_derivative() {
        let roots = Roots::new();
        let part = UploadPart::new(
            crate::test_helpers::encode_test_jpeg(8, 8),
            "photo.heic",
            "image/heic",
        );

        let result = ingest(&part, &roots.targets(), &RustBackend::new(), &DerivativeConfig::default())
            .unwrap()
            .unwrap();

        assert!(result.record.filename.ends_with(".heic"));
        assert!(!result.is_complete());
        assert_eq!(roots.originals.len(), 1);
    }

    #[test]
    fn batch_returns_one_record_per_image() {
        let roots = Roots::new();
        let parts = vec![
            jpeg_part("a.jpg", 16, 16),
            text_part("readme.txt"),
            gray_png_part("b.png", 90),
            jpeg_part("c", 16, 16),
        ];

        let results = ingest_batch(
            &parts,
            &roots.targets(),
            &RustBackend::new(),
            &DerivativeConfig::default(),
        )
        .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_complete()));

        let names: HashSet<&str> = results.iter().map(|r| r.record.filename.as_str()).collect();
        assert_eq!(names.len(), 3);

        // Submission order survives parallel processing
        assert!(results[0].record.filename.ends_with(".jpg"));
        assert!(results[1].record.filename.ends_with(".png"));
        assert!(results[2].record.filename.ends_with(".jpg"));

        assert_eq!(roots.originals.len(), 3);
        assert_eq!(roots.resized.len(), 3);
    }

    #[test]
    fn batch_at_limit_is_accepted() {
        let roots = Roots::new();
        let parts: Vec<UploadPart> = (0..MAX_BATCH_FILES)
            .map(|i| jpeg_part(&format!("{i}.jpg"), 4, 4))
            .collect();

        let results = ingest_batch(
            &parts,
            &roots.targets(),
            &MockBackend::new(),
            &DerivativeConfig::default(),
        )
        .unwrap();

        assert_eq!(results.len(), MAX_BATCH_FILES);
    }

    #[test]
    fn oversized_batch_writes_nothing() {
        let roots = Roots::new();
        let parts: Vec<UploadPart> = (0..MAX_BATCH_FILES + 1)
            .map(|i| jpeg_part(&format!("{i}.jpg"), 4, 4))
            .collect();

        let result = ingest_batch(
            &parts,
            &roots.targets(),
            &MockBackend::new(),
            &DerivativeConfig::default(),
        );

        assert!(matches!(
            result,
            Err(IngestError::BatchTooLarge { count: 21, max: 20 })
        ));
        assert!(roots.originals.is_empty());
        assert!(roots.resized.is_empty());
    }

    #[test]
    fn empty_batch_is_empty_result() {
        let roots = Roots::new();
        let results = ingest_batch(
            &[],
            &roots.targets(),
            &MockBackend::new(),
            &DerivativeConfig::default(),
        )
        .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn record_serializes_with_url_keys() {
        let record = StoredImageRecord {
            filename: "ab.jpg".to_string(),
            original_url: "/images/original/ab.jpg".to_string(),
            resized_url: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["url"], "/images/original/ab.jpg");
        assert!(json["resized"].is_null());
    }

    #[test]
    fn ingested_image_serializes_flat_with_status() {
        let image = IngestedImage {
            record: StoredImageRecord {
                filename: "ab.jpg".to_string(),
                original_url: "/images/original/ab.jpg".to_string(),
                resized_url: None,
            },
            outcome: IngestOutcome::DerivativeMissing {
                reason: "Decode error: bad".to_string(),
            },
        };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["filename"], "ab.jpg");
        assert_eq!(json["outcome"]["status"], "derivative_missing");
        assert_eq!(json["outcome"]["reason"], "Decode error: bad");
    }
}
