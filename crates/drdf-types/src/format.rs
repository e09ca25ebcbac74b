use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::pixel::PixelType;

/// Encoded size of a format descriptor (the `IFMT` payload).
pub const FORMAT_DESCRIPTOR_LEN: usize = 8;

/// Image format descriptor: dimensions and pixel layout.
///
/// Packed on disk as `{size_x: u16, size_y: u16, pixel_type: u8,
/// reserved: u8, reserved: u16}`, little-endian. The reserved bytes are
/// carried through decode/encode unchanged and are zero for formats built
/// with [`ImageFormat::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageFormat {
    pub size_x: u16,
    pub size_y: u16,
    pub pixel_type: PixelType,
    #[serde(default)]
    reserved: [u8; 3],
}

impl ImageFormat {
    pub const fn new(size_x: u16, size_y: u16, pixel_type: PixelType) -> Self {
        Self {
            size_x,
            size_y,
            pixel_type,
            reserved: [0; 3],
        }
    }

    /// Byte length of a pixel buffer in this format.
    pub fn size(&self) -> usize {
        self.pixel_count() * self.pixel_type.byte_size()
    }

    /// Number of pixels (`size_x * size_y`).
    pub fn pixel_count(&self) -> usize {
        usize::from(self.size_x) * usize::from(self.size_y)
    }

    /// Encode into the 8-byte descriptor.
    pub fn to_bytes(&self) -> [u8; FORMAT_DESCRIPTOR_LEN] {
        let mut out = [0u8; FORMAT_DESCRIPTOR_LEN];
        out[0..2].copy_from_slice(&self.size_x.to_le_bytes());
        out[2..4].copy_from_slice(&self.size_y.to_le_bytes());
        out[4] = self.pixel_type.code();
        out[5..8].copy_from_slice(&self.reserved);
        out
    }

    /// Decode an 8-byte descriptor, rejecting unknown pixel type codes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() != FORMAT_DESCRIPTOR_LEN {
            return Err(TypeError::InvalidLength {
                expected: FORMAT_DESCRIPTOR_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            size_x: u16::from_le_bytes([bytes[0], bytes[1]]),
            size_y: u16::from_le_bytes([bytes[2], bytes[3]]),
            pixel_type: PixelType::try_from(bytes[4])?,
            reserved: [bytes[5], bytes[6], bytes[7]],
        })
    }
}

/// The format of an image that owns no pixels.
impl Default for ImageFormat {
    fn default() -> Self {
        Self::new(0, 0, PixelType::Au8)
    }
}
