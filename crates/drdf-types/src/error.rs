use thiserror::Error;

use crate::pixel::PixelType;

/// Errors produced by identifier parsing and image access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid run id: {0}")]
    InvalidRunId(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown pixel type code: {0}")]
    UnknownPixelType(u8),

    #[error("pixel ({x}, {y}) out of range for {width}x{height} image")]
    PixelOutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("pixel type mismatch: image stores {stored}, view requested {requested}")]
    PixelTypeMismatch {
        stored: PixelType,
        requested: PixelType,
    },
}
