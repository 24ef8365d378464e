//! CLI output formatting for every subcommand.
//!
//! # Output Format
//!
//! ## Upload
//!
//! ```text
//! Stored 2 of 3 files
//! 001 4f0c…e1.jpg
//!     Original: /images/original/4f0c…e1.jpg
//!     Resized: /images/resized/4f0c…e1.jpg
//! 002 9ab2…7d.png
//!     Original: /images/original/9ab2…7d.png
//!     Resized: missing (Decode error: …)
//! ```
//!
//! ## Check
//!
//! ```text
//! dusk.jpg: pass (score 118.42)
//!     Stored: /images/brightness_pass/77c1…0a.jpg
//! ```
//!
//! ## List
//!
//! ```text
//! original (2 files)
//!     /images/original/4f0c…e1.jpg
//!     /images/original/9ab2…7d.png
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure. `--json` output bypasses this module and serializes the response
//! types directly.

use crate::ingest::IngestOutcome;
use crate::service::{BrightnessReport, FetchedImage, RootKind, UploadResponse};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// upload
// ============================================================================

/// Format an upload response. `submitted` is the number of files sent.
pub fn format_upload_output(response: &UploadResponse, submitted: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "Stored {} of {}",
        response.count,
        plural(submitted, "file")
    )];

    for (i, file) in response.files.iter().enumerate() {
        let record = &file.record;
        lines.push(format!("{} {}", format_index(i + 1), record.filename));
        lines.push(format!("    Original: {}", record.original_url));
        match (&file.outcome, &record.resized_url) {
            (IngestOutcome::Complete, Some(url)) => {
                lines.push(format!("    Resized: {}", url));
            }
            (IngestOutcome::DerivativeMissing { reason }, _) => {
                lines.push(format!("    Resized: missing ({})", reason));
            }
            (IngestOutcome::Complete, None) => {
                lines.push("    Resized: missing".to_string());
            }
        }
    }

    let skipped = submitted.saturating_sub(response.count);
    if skipped > 0 {
        lines.push(format!("Skipped {} (not images)", plural(skipped, "file")));
    }
    lines
}

pub fn print_upload_output(response: &UploadResponse, submitted: usize) {
    for line in format_upload_output(response, submitted) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

pub fn format_brightness_output(report: &BrightnessReport) -> Vec<String> {
    let verdict = if report.passed { "pass" } else { "fail" };
    vec![
        format!(
            "{}: {} (score {:.2})",
            report.original_name, verdict, report.score
        ),
        format!("    Stored: {}", report.url),
    ]
}

pub fn print_brightness_output(report: &BrightnessReport) {
    for line in format_brightness_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// list
// ============================================================================

pub fn format_list_output(kind: RootKind, paths: &[String]) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", kind, plural(paths.len(), "file"))];
    lines.extend(paths.iter().map(|p| format!("    {}", p)));
    lines
}

pub fn print_list_output(kind: RootKind, paths: &[String]) {
    for line in format_list_output(kind, paths) {
        println!("{}", line);
    }
}

// ============================================================================
// fetch
// ============================================================================

pub fn format_fetch_output(image: &FetchedImage, dest: &Path) -> Vec<String> {
    vec![format!(
        "{} ({}, {} bytes) → {}",
        image.filename,
        image.content_type,
        image.bytes.len(),
        dest.display()
    )]
}

pub fn print_fetch_output(image: &FetchedImage, dest: &Path) {
    for line in format_fetch_output(image, dest) {
        println!("{}", line);
    }
}
