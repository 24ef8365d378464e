//! # Photo Intake
//!
//! The core of a small image intake service. Callers upload image files; the
//! service stores each original, derives a resized copy, and can classify an
//! image as too dark, too bright, or acceptable. Everything lives in flat
//! storage roots on disk, and a listing of a root is the only index.
//!
//! # Request Flows
//!
//! ```text
//! upload   parts  →  original/<uuid>.<ext>  +  resized/<uuid>.<ext>
//! check    part   →  decode → mean luminance → brightness_pass/ or brightness_fail/
//! list     root   →  sorted retrieval paths
//! fetch    name   →  bytes + content type
//! ```
//!
//! There is no HTTP layer in this crate. [`service::ImageService`] is the
//! surface an HTTP router or the bundled CLI calls into, and its errors carry
//! the status code an HTTP layer should answer with.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`service`] | Request-level operations, storage layout, response types |
//! | [`ingest`] | Upload ingestion: batch limit, original write, derivative with failure containment |
//! | [`brightness`] | Mean-luminance classifier with inclusive `[60, 200]` bounds |
//! | [`storage`] | `StorageRoot` trait with directory and in-memory implementations |
//! | [`naming`] | Collision-resistant stored filenames from untrusted caller names |
//! | [`imaging`] | Pure-Rust decode, resize and encode behind the `ImageBackend` trait |
//! | [`config`] | `photo-intake.toml` loading, merging and validation |
//! | [`types`] | Request input types (`UploadPart`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Caller Filenames Never Touch the Filesystem
//!
//! Every stored file gets a fresh UUIDv4 name; the caller's filename only
//! contributes an extension, and only when it is short and alphanumeric. Path
//! traversal through upload names is impossible, and concurrent uploads of
//! `photo.jpg` never overwrite each other. Storage roots additionally refuse
//! any name that is not a single plain path component, so a crafted `fetch`
//! cannot escape its root either.
//!
//! ## Originals First, Derivatives Best-Effort
//!
//! An original is written before its derivative is attempted. If decoding,
//! resizing or encoding fails, the original stays and the result says so with
//! [`ingest::IngestOutcome::DerivativeMissing`] instead of failing the whole
//! batch. A listing of `resized/` may therefore be shorter than `original/`.
//!
//! ## Shrink to Fit by Default
//!
//! Derivatives keep their aspect ratio and fit inside 1280×1280 without ever
//! upscaling. An exact stretch to a fixed box is available through
//! `[resize] policy = "exact"` for deployments that depend on fixed output
//! dimensions.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and encoding use the `image` crate with its pure-Rust codecs and
//! Lanczos3 resampling, so the binary has no system library dependencies.

pub mod brightness;
pub mod config;
pub mod imaging;
pub mod ingest;
pub mod naming;
pub mod output;
pub mod service;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
