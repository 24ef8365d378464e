//! Image processing: pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with format sniffing |
//! | **Normalize** | `to_rgb8` |
//! | **Resize** | fit-within or exact, `Lanczos3` |
//! | **Encode** | format from the stored filename's extension |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Derivative, Dimensions, ImageBackend};
pub use calculations::{fit_within, target_dimensions};
pub use operations::{DerivativeConfig, create_derivative, format_for_filename};
pub use params::{Quality, ResizeParams, ResizePolicy};
pub use rust_backend::RustBackend;
