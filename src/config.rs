//! Service configuration module.
//!
//! Handles loading, validating, and merging `photo-intake.toml`. Stock
//! defaults are serialized to a TOML table and the user's file is merged on
//! top, so a config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [storage]
//! base = "images"           # Directory holding the storage roots
//! url_prefix = "/images"    # Prefix of retrieval paths handed back to callers
//!
//! [resize]
//! policy = "fit"            # "fit" (keep aspect, shrink only) or "exact" (stretch)
//! width = 1280              # Bounding box width for "fit", output width for "exact"
//! height = 1280             # Bounding box height for "fit", output height for "exact"
//! quality = 90              # JPEG quality of derivatives (1-100)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers per batch (omit for auto = CPU cores)
//! ```
//!
//! Brightness bounds and the batch limit are fixed and not configurable.
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{DerivativeConfig, Quality, ResizePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "photo-intake.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Service configuration loaded from `photo-intake.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Where the storage roots live and how they are addressed.
    pub storage: StorageConfig,
    /// Derivative sizing and encoding.
    pub resize: ResizeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ServiceConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize.width == 0 || self.resize.height == 0 {
            return Err(ConfigError::Validation(
                "resize.width and resize.height must be non-zero".into(),
            ));
        }
        if self.resize.quality == 0 || self.resize.quality > 100 {
            return Err(ConfigError::Validation(
                "resize.quality must be 1-100".into(),
            ));
        }
        if self.storage.base.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.base must not be empty".into(),
            ));
        }
        if !self.storage.url_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "storage.url_prefix must start with '/'".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Storage layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory containing `original/`, `resized/`, `brightness_pass/` and
    /// `brightness_fail/`.
    pub base: PathBuf,
    /// Prefix of retrieval paths, e.g. `/images` → `/images/original/<name>`.
    pub url_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base: PathBuf::from("images"),
            url_prefix: "/images".to_string(),
        }
    }
}

/// How derivatives are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Aspect-preserving shrink into the box.
    #[default]
    Fit,
    /// Stretch to the exact box.
    Exact,
}

/// Derivative generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub policy: ResizeMode,
    pub width: u32,
    pub height: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            policy: ResizeMode::Fit,
            width: 1280,
            height: 1280,
            quality: 90,
        }
    }
}

impl ResizeConfig {
    pub fn resize_policy(&self) -> ResizePolicy {
        match self.policy {
            ResizeMode::Fit => ResizePolicy::Fit {
                max_width: self.width,
                max_height: self.height,
            },
            ResizeMode::Exact => ResizePolicy::Exact {
                width: self.width,
                height: self.height,
            },
        }
    }

    pub fn derivative_config(&self) -> DerivativeConfig {
        DerivativeConfig {
            policy: self.resize_policy(),
            quality: Quality::new(self.quality),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers for one upload batch.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ServiceConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ServiceConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ServiceConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`.
///
/// A missing file yields the stock defaults. Merges user values on top of
/// stock defaults, rejects unknown keys, and validates the result.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `photo-intake.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-intake configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Directory holding the four storage roots:
#   original/         uploaded files, byte for byte
#   resized/          derivatives, same filename as the original
#   brightness_pass/  brightness checks that passed
#   brightness_fail/  brightness checks that failed
base = "images"

# Prefix of the retrieval paths returned to callers:
#   /images/original/<filename>
url_prefix = "/images"

# ---------------------------------------------------------------------------
# Derivatives
# ---------------------------------------------------------------------------
[resize]
# "fit":   shrink to fit inside width x height, keeping aspect ratio.
#          Images already inside the box are re-encoded at their own size.
# "exact": stretch to exactly width x height (e.g. 1280 x 853).
policy = "fit"
width = 1280
height = 1280

# JPEG encoding quality for derivatives (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for the files of one upload batch.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
