use std::fmt;

use crate::error::{FormatError, FormatResult};

/// Length prefix plus tag.
pub const HEADER_LEN: usize = 8;

/// The chunk tags a DRDF stream may contain.
///
/// On disk a tag is four ASCII bytes, not terminated and not length-prefixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkTag {
    /// File header, empty, always first.
    Hraw,
    /// File trailer carrying the checksum, always last.
    Eraw,
    /// Run start: 16-byte run id.
    Rsta,
    /// Legacy tag, payload ignored.
    Rccd,
    /// Run georef string.
    Rgeo,
    /// Event start: 4-byte event id.
    Evnt,
    /// Pixel data for the current image.
    Idat,
    /// Source id of the next image.
    Isrc,
    /// 8-byte image format descriptor.
    Ifmt,
}

impl ChunkTag {
    pub const ALL: [Self; 9] = [
        Self::Hraw,
        Self::Eraw,
        Self::Rsta,
        Self::Rccd,
        Self::Rgeo,
        Self::Evnt,
        Self::Idat,
        Self::Isrc,
        Self::Ifmt,
    ];

    pub const fn as_bytes(self) -> &'static [u8; 4] {
        match self {
            Self::Hraw => b"HRAW",
            Self::Eraw => b"ERAW",
            Self::Rsta => b"RSTA",
            Self::Rccd => b"RCCD",
            Self::Rgeo => b"RGEO",
            Self::Evnt => b"EVNT",
            Self::Idat => b"IDAT",
            Self::Isrc => b"ISRC",
            Self::Ifmt => b"IFMT",
        }
    }

    pub fn from_bytes(bytes: &[u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_bytes() == bytes)
    }

    /// Payload length fixed by the format, if any.
    ///
    /// `IDAT` is not listed: its length depends on the active image format.
    pub const fn expected_len(self) -> Option<usize> {
        match self {
            Self::Hraw => Some(0),
            Self::Eraw | Self::Evnt => Some(4),
            Self::Rsta => Some(16),
            Self::Ifmt => Some(8),
            Self::Rccd | Self::Rgeo | Self::Idat | Self::Isrc => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hraw => "HRAW",
            Self::Eraw => "ERAW",
            Self::Rsta => "RSTA",
            Self::Rccd => "RCCD",
            Self::Rgeo => "RGEO",
            Self::Evnt => "EVNT",
            Self::Idat => "IDAT",
            Self::Isrc => "ISRC",
            Self::Ifmt => "IFMT",
        }
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode the 8-byte header of a chunk carrying `len` payload bytes.
pub fn encode_header(tag: ChunkTag, len: u32) -> [u8; HEADER_LEN] {
    let mut out = [0u8; HEADER_LEN];
    out[0..4].copy_from_slice(&len.to_le_bytes());
    out[4..8].copy_from_slice(tag.as_bytes());
    out
}

/// A framed chunk borrowed from the input buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawChunk<'b> {
    pub tag: ChunkTag,
    /// Absolute offset of the length prefix.
    pub offset: u64,
    /// The length prefix and tag as they appear on disk.
    pub header: &'b [u8],
    pub payload: &'b [u8],
}

impl RawChunk<'_> {
    /// Declared payload length.
    pub fn len(&self) -> u32 {
        self.payload.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Fail unless the payload length equals `expected`.
    pub fn expect_len(&self, expected: usize) -> FormatResult<()> {
        if self.payload.len() == expected {
            Ok(())
        } else {
            Err(FormatError::InvalidChunkLength {
                tag: self.tag,
                offset: self.offset,
                length: self.len(),
                expected,
            })
        }
    }
}

/// Splits a byte buffer into successive chunks.
///
/// Unlike a plain iterator every step is fallible: framing problems are
/// reported with the offset they occur at instead of ending the stream.
#[derive(Clone, Debug)]
pub struct ChunkCursor<'b> {
    rest: &'b [u8],
    offset: u64,
}

impl<'b> ChunkCursor<'b> {
    pub fn new(bytes: &'b [u8]) -> Self {
        Self {
            rest: bytes,
            offset: 0,
        }
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn remaining(&self) -> &'b [u8] {
        self.rest
    }

    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    /// Read the next chunk, or `None` when the buffer is exhausted.
    pub fn next_chunk(&mut self) -> FormatResult<Option<RawChunk<'b>>> {
        if self.rest.is_empty() {
            return Ok(None);
        }
        let offset = self.offset;
        if self.rest.len() < HEADER_LEN {
            return Err(FormatError::TruncatedHeader {
                offset,
                remaining: self.rest.len() as u64,
            });
        }
        let (header, body) = self.rest.split_at(HEADER_LEN);
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let tag_bytes = [header[4], header[5], header[6], header[7]];
        let tag = ChunkTag::from_bytes(&tag_bytes).ok_or_else(|| FormatError::UnknownChunkTag {
            offset,
            tag: String::from_utf8_lossy(&tag_bytes).into_owned(),
        })?;

        let len = length as usize;
        if body.len() < len {
            return Err(FormatError::ChunkOutOfRange {
                tag,
                offset,
                length,
                remaining: body.len() as u64,
            });
        }
        let (payload, rest) = body.split_at(len);
        self.rest = rest;
        self.offset += (HEADER_LEN + len) as u64;
        Ok(Some(RawChunk {
            tag,
            offset,
            header,
            payload,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = (payload.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(tag);
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn tag_bytes_roundtrip() {
        for tag in ChunkTag::ALL {
            assert_eq!(ChunkTag::from_bytes(tag.as_bytes()), Some(tag));
        }
        assert_eq!(ChunkTag::from_bytes(b"IEND"), None);
        assert_eq!(ChunkTag::from_bytes(b"hraw"), None);
    }

    #[test]
    fn tag_display() {
        assert_eq!(ChunkTag::Ifmt.to_string(), "IFMT");
        assert_eq!(ChunkTag::Rccd.as_str(), "RCCD");
    }

    #[test]
    fn fixed_lengths() {
        assert_eq!(ChunkTag::Hraw.expected_len(), Some(0));
        assert_eq!(ChunkTag::Rsta.expected_len(), Some(16));
        assert_eq!(ChunkTag::Evnt.expected_len(), Some(4));
        assert_eq!(ChunkTag::Ifmt.expected_len(), Some(8));
        assert_eq!(ChunkTag::Eraw.expected_len(), Some(4));
        assert_eq!(ChunkTag::Idat.expected_len(), None);
    }

    #[test]
    fn header_layout() {
        assert_eq!(
            encode_header(ChunkTag::Eraw, 4),
            [4, 0, 0, 0, b'E', b'R', b'A', b'W']
        );
        assert_eq!(&encode_header(ChunkTag::Hraw, 0)[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn cursor_walks_chunks() {
        let mut bytes = chunk(b"HRAW", b"");
        bytes.extend(chunk(b"ISRC", b"S1"));
        bytes.extend(chunk(b"EVNT", &42u32.to_le_bytes()));

        let mut cursor = ChunkCursor::new(&bytes);
        let hraw = cursor.next_chunk().unwrap().unwrap();
        assert_eq!(hraw.tag, ChunkTag::Hraw);
        assert!(hraw.is_empty());

        let isrc = cursor.next_chunk().unwrap().unwrap();
        assert_eq!(isrc.tag, ChunkTag::Isrc);
        assert_eq!(isrc.offset, 8);
        assert_eq!(isrc.payload, b"S1");
        assert_eq!(isrc.header, &bytes[8..16]);

        let evnt = cursor.next_chunk().unwrap().unwrap();
        assert_eq!(evnt.offset, 18);
        evnt.expect_len(4).unwrap();
        assert!(cursor.next_chunk().unwrap().is_none());
        assert_eq!(cursor.offset(), bytes.len() as u64);
    }

    #[test]
    fn unknown_tag_reports_offset() {
        let mut bytes = chunk(b"HRAW", b"");
        bytes.extend(chunk(b"XXXX", b"abc"));
        let mut cursor = ChunkCursor::new(&bytes);
        cursor.next_chunk().unwrap();
        match cursor.next_chunk().unwrap_err() {
            FormatError::UnknownChunkTag { offset, tag } => {
                assert_eq!(offset, 8);
                assert_eq!(tag, "XXXX");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn payload_past_end_names_length() {
        let mut bytes = chunk(b"RGEO", b"geo://x");
        bytes.truncate(bytes.len() - 2);
        let err = ChunkCursor::new(&bytes).next_chunk().unwrap_err();
        assert!(matches!(
            err,
            FormatError::ChunkOutOfRange {
                tag: ChunkTag::Rgeo,
                length: 7,
                remaining: 5,
                ..
            }
        ));
    }

    #[test]
    fn short_header_is_truncated() {
        let err = ChunkCursor::new(&[4, 0, 0]).next_chunk().unwrap_err();
        assert!(matches!(
            err,
            FormatError::TruncatedHeader {
                offset: 0,
                remaining: 3
            }
        ));
    }

    #[test]
    fn expect_len_rejects_mismatch() {
        let bytes = chunk(b"RSTA", &[0; 15]);
        let raw = ChunkCursor::new(&bytes).next_chunk().unwrap().unwrap();
        let err = raw.expect_len(16).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidChunkLength {
                tag: ChunkTag::Rsta,
                length: 15,
                expected: 16,
                ..
            }
        ));
    }

    #[test]
    fn huge_length_does_not_overflow() {
        let mut bytes = u32::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"IDAT");
        let err = ChunkCursor::new(&bytes).next_chunk().unwrap_err();
        assert!(matches!(
            err,
            FormatError::ChunkOutOfRange {
                length: u32::MAX,
                remaining: 0,
                ..
            }
        ));
    }
}
