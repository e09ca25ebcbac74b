use thiserror::Error;

use crate::chunk::ChunkTag;

/// Every way decoding or encoding a DRDF stream can fail.
///
/// Decoding errors are fatal: a failed read returns no partial store.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("not a DRDF file: {reason}")]
    MalformedSignature { reason: String },

    #[error("unknown chunk tag {tag:?} at offset {offset}")]
    UnknownChunkTag { offset: u64, tag: String },

    #[error("truncated chunk header at offset {offset}: {remaining} bytes remain")]
    TruncatedHeader { offset: u64, remaining: u64 },

    #[error("{tag} chunk at offset {offset} declares {length} bytes but only {remaining} remain")]
    ChunkOutOfRange {
        tag: ChunkTag,
        offset: u64,
        length: u32,
        remaining: u64,
    },

    #[error("{tag} chunk at offset {offset} has length {length}, expected {expected}")]
    InvalidChunkLength {
        tag: ChunkTag,
        offset: u64,
        length: u32,
        expected: usize,
    },

    #[error("checksum mismatch: file says {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("incomplete file: stream ended without an ERAW chunk")]
    IncompleteFile,

    #[error("{tag} chunk at offset {offset} appears before any {missing}")]
    OrphanChunk {
        tag: ChunkTag,
        offset: u64,
        missing: &'static str,
    },

    #[error("duplicate run {run}")]
    DuplicateRun { run: String },

    #[error("duplicate event {event} in run {run}")]
    DuplicateEvent { run: String, event: u32 },

    #[error("duplicate image {source_id:?} in run {run} event {event}")]
    DuplicateImage {
        run: String,
        event: u32,
        source_id: String,
    },

    #[error("invalid image format at offset {offset}: unknown pixel type code {code}")]
    InvalidImageFormat { offset: u64, code: u8 },

    #[error("{tag} chunk at offset {offset} is not valid UTF-8")]
    InvalidText { tag: ChunkTag, offset: u64 },

    #[error("{extra} bytes after the ERAW chunk at offset {offset}")]
    TrailingData { offset: u64, extra: u64 },

    #[error("{tag} payload of {len} bytes does not fit a 32-bit length")]
    PayloadTooLarge { tag: ChunkTag, len: usize },

    #[error("{tag} chunks are written only by finish")]
    ReservedTag { tag: ChunkTag },

    #[error("writer already emitted its ERAW trailer")]
    WriterFinished,

    #[error("file is {size} bytes, limit is {max}")]
    FileTooLarge { size: u64, max: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FormatResult<T> = Result<T, FormatError>;
