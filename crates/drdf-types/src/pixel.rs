use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Pixel layout code, as stored in the `pixel_type` byte of a format descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum PixelType {
    /// Amplitude, 8 bit unsigned.
    Au8 = 0,
    /// Amplitude and time, 8 bit unsigned each.
    Au8Tu8 = 1,
    /// Amplitude, 16 bit unsigned.
    Au16 = 2,
    /// Amplitude and time, 16 bit unsigned each.
    Au16Tu16 = 3,
    /// Amplitude and time, 32 bit float each.
    Af32Tf32 = 4,
}

impl PixelType {
    /// Every supported pixel type, in code order.
    pub const ALL: [Self; 5] = [
        Self::Au8,
        Self::Au8Tu8,
        Self::Au16,
        Self::Au16Tu16,
        Self::Af32Tf32,
    ];

    /// Size of one pixel in bytes.
    pub const fn byte_size(self) -> usize {
        match self {
            Self::Au8 => 1,
            Self::Au8Tu8 => 2,
            Self::Au16 => 2,
            Self::Au16Tu16 => 4,
            Self::Af32Tf32 => 8,
        }
    }

    /// The on-disk code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether records of this type carry an arrival time.
    pub const fn has_time(self) -> bool {
        !matches!(self, Self::Au8 | Self::Au16)
    }
}

impl TryFrom<u8> for PixelType {
    type Error = TypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(TypeError::UnknownPixelType(code))
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Au8 => "Au8",
            Self::Au8Tu8 => "Au8Tu8",
            Self::Au16 => "Au16",
            Self::Au16Tu16 => "Au16Tu16",
            Self::Af32Tf32 => "Af32Tf32",
        };
        f.write_str(name)
    }
}

/// A fixed-layout pixel record.
///
/// Records are stored little-endian, amplitude first, in exactly
/// `Self::TYPE.byte_size()` bytes. Implementations must read and write that
/// many bytes; the slices handed to them always have that length.
pub trait Pixel: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The layout code this record corresponds to.
    const TYPE: PixelType;

    /// Decode one record from its little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encode this record into `out`.
    fn write_le(&self, out: &mut [u8]);

    /// Amplitude as a float, whatever the stored width.
    fn amplitude(&self) -> f64;

    /// Arrival time, for layouts that record one.
    fn time(&self) -> Option<f64>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelAu8 {
    pub amplitude: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelAu8Tu8 {
    pub amplitude: u8,
    pub time: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelAu16 {
    pub amplitude: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelAu16Tu16 {
    pub amplitude: u16,
    pub time: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelAf32Tf32 {
    pub amplitude: f32,
    pub time: f32,
}

impl Pixel for PixelAu8 {
    const TYPE: PixelType = PixelType::Au8;

    fn read_le(bytes: &[u8]) -> Self {
        Self { amplitude: bytes[0] }
    }

    fn write_le(&self, out: &mut [u8]) {
        out[0] = self.amplitude;
    }

    fn amplitude(&self) -> f64 {
        f64::from(self.amplitude)
    }

    fn time(&self) -> Option<f64> {
        None
    }
}

impl Pixel for PixelAu8Tu8 {
    const TYPE: PixelType = PixelType::Au8Tu8;

    fn read_le(bytes: &[u8]) -> Self {
        Self {
            amplitude: bytes[0],
            time: bytes[1],
        }
    }

    fn write_le(&self, out: &mut [u8]) {
        out[0] = self.amplitude;
        out[1] = self.time;
    }

    fn amplitude(&self) -> f64 {
        f64::from(self.amplitude)
    }

    fn time(&self) -> Option<f64> {
        Some(f64::from(self.time))
    }
}

impl Pixel for PixelAu16 {
    const TYPE: PixelType = PixelType::Au16;

    fn read_le(bytes: &[u8]) -> Self {
        Self {
            amplitude: u16::from_le_bytes([bytes[0], bytes[1]]),
        }
    }

    fn write_le(&self, out: &mut [u8]) {
        out[..2].copy_from_slice(&self.amplitude.to_le_bytes());
    }

    fn amplitude(&self) -> f64 {
        f64::from(self.amplitude)
    }

    fn time(&self) -> Option<f64> {
        None
    }
}

impl Pixel for PixelAu16Tu16 {
    const TYPE: PixelType = PixelType::Au16Tu16;

    fn read_le(bytes: &[u8]) -> Self {
        Self {
            amplitude: u16::from_le_bytes([bytes[0], bytes[1]]),
            time: u16::from_le_bytes([bytes[2], bytes[3]]),
        }
    }

    fn write_le(&self, out: &mut [u8]) {
        out[..2].copy_from_slice(&self.amplitude.to_le_bytes());
        out[2..4].copy_from_slice(&self.time.to_le_bytes());
    }

    fn amplitude(&self) -> f64 {
        f64::from(self.amplitude)
    }

    fn time(&self) -> Option<f64> {
        Some(f64::from(self.time))
    }
}

impl Pixel for PixelAf32Tf32 {
    const TYPE: PixelType = PixelType::Af32Tf32;

    fn read_le(bytes: &[u8]) -> Self {
        Self {
            amplitude: f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            time: f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    fn write_le(&self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.amplitude.to_le_bytes());
        out[4..8].copy_from_slice(&self.time.to_le_bytes());
    }

    fn amplitude(&self) -> f64 {
        f64::from(self.amplitude)
    }

    fn time(&self) -> Option<f64> {
        Some(f64::from(self.time))
    }
}
