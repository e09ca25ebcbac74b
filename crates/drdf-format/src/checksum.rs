//! CRC-32 accumulation over a DRDF byte stream.
//!
//! The state carried between calls is the finished (complemented) CRC value,
//! zlib style, so `update(update(s, a), b) == update(s, a ++ b)`. Files start
//! from [`INITIAL`] rather than zero.

use crc32fast::Hasher;

/// Starting state for a file checksum.
pub const INITIAL: u32 = 0xFFFF_FFFF;

/// Fold `bytes` into a running checksum state.
pub fn update(state: u32, bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(state);
    hasher.update(bytes);
    hasher.finalize()
}

/// Incremental checksum used by the reader and the writer.
#[derive(Clone, Debug)]
pub struct Checksum {
    hasher: Hasher,
}

impl Checksum {
    /// A checksum in the file starting state.
    pub fn new() -> Self {
        Self::resume(INITIAL)
    }

    /// Continue from a previously returned state.
    pub fn resume(state: u32) -> Self {
        Self {
            hasher: Hasher::new_with_initial(state),
        }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Current state. Does not consume the accumulator.
    pub fn value(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}

impl Default for Checksum {
    fn default() -> Self {
        Self::new()
    }
}
