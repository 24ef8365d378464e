//! Stored filename generation.
//!
//! Every file written to a storage root gets a name of the form
//! `<32 hex chars><.ext>`: a random UUIDv4 token followed by the extension of
//! the caller's filename. The caller's filename contributes *only* the
//! extension, and only when it is short and purely alphanumeric:
//!
//! - `holiday.PNG` → `3f2a…9c1e.PNG`
//! - `../../etc/passwd.jpg` → `….jpg` (the directory part never reaches storage)
//! - `scan` / `scan.` / `archive.tar.g!z` → `….jpg` (fallback extension)
//!
//! Random tokens make concurrent writers collision-free without locks.

use std::path::Path;
use uuid::Uuid;

/// Extension used when the caller's filename has no usable one.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Longest caller extension that is carried over.
const MAX_EXTENSION_LEN: usize = 10;

/// Generate a fresh stored filename for an upload named `original_name`.
pub fn stored_filename(original_name: &str) -> String {
    let token = Uuid::new_v4().simple();
    format!("{token}.{}", extension_of(original_name))
}

/// Extension to keep from a caller-supplied filename, without the dot.
///
/// Returns [`DEFAULT_EXTENSION`] unless the extension is 1–10 ASCII
/// alphanumerics. Case is preserved.
pub fn extension_of(original_name: &str) -> &str {
    // Callers on Windows send backslash paths; only the last component matters.
    let last = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    Path::new(last)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or(DEFAULT_EXTENSION)
}
