use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Event number, unique within its owning run.
pub type EventId = u32;

/// Name of the sensor an image was read out from (ASCII by convention).
pub type SourceId = String;

/// Identifier for a run (RFC 4122 UUID, version 1 for newly generated runs).
///
/// Ordering is byte-lexicographic over the 16 RFC 4122 bytes, which is the
/// order runs are emitted in when a store is written.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a new time-based run ID (UUID v1).
    ///
    /// The node field is random with the multicast bit set, as RFC 4122
    /// requires for node ids not taken from a network card.
    pub fn new_v1() -> Self {
        let mut node = [0u8; 6];
        rand::thread_rng().fill(&mut node);
        node[0] |= 0x01;
        Self(Uuid::now_v1(&node))
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create from the 16 bytes stored in an `RSTA` chunk.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse from a byte slice that must be exactly 16 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: 16,
            actual: bytes.len(),
        })?;
        Ok(Self::from_bytes(arr))
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// The 16 bytes in RFC 4122 order.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new_v1()
    }
}

impl FromStr for RunId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidRunId(e.to_string()))
    }
}

impl fmt::Debug for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RunId({})", self.short_id())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for RunId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
