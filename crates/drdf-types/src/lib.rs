//! Foundation types for the Detector Response Data Format (DRDF).
//!
//! This crate provides the identifier, pixel and image types shared by the
//! store and the codec. Every other DRDF crate depends on `drdf-types`.
//!
//! # Key Types
//!
//! - [`RunId`] — RFC 4122 run identifier (type 1 for newly created runs)
//! - [`EventId`] / [`SourceId`] — event numbers and sensor names
//! - [`PixelType`] — the five supported pixel layouts and their byte widths
//! - [`ImageFormat`] — the 8-byte `IFMT` descriptor
//! - [`Image`] — an owned pixel buffer with runtime-checked typed views

pub mod error;
pub mod format;
pub mod id;
pub mod image;
pub mod pixel;
pub mod view;

pub use error::TypeError;
pub use format::{ImageFormat, FORMAT_DESCRIPTOR_LEN};
pub use id::{EventId, RunId, SourceId};
pub use image::Image;
pub use pixel::{
    Pixel, PixelAf32Tf32, PixelAu16, PixelAu16Tu16, PixelAu8, PixelAu8Tu8, PixelType,
};
pub use view::{ImageView, ImageViewMut};
