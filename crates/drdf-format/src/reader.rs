use std::path::Path;

use drdf_store::DrdfStore;
use drdf_types::{EventId, Image, ImageFormat, RunId, SourceId};
use tracing::{debug, warn};

use crate::checksum::Checksum;
use crate::chunk::{encode_header, ChunkCursor, ChunkTag, RawChunk, HEADER_LEN};
use crate::config::{DuplicatePolicy, ReadConfig};
use crate::error::{FormatError, FormatResult};
use crate::StreamSummary;

/// Smallest well-formed file: `HRAW` header plus the `ERAW` trailer.
pub const MIN_FILE_LEN: usize = 2 * HEADER_LEN + 4;

/// Decodes DRDF byte streams into a [`DrdfStore`].
///
/// Framing and the trailing checksum are verified before any payload is
/// interpreted, so a damaged byte inside a well-framed chunk is reported as
/// [`FormatError::ChecksumMismatch`]. Any violation aborts the read; there is
/// no partial result.
#[derive(Clone, Debug, Default)]
pub struct DrdfReader {
    config: ReadConfig,
}

/// Position in the hierarchy established by earlier chunks.
#[derive(Debug, Default)]
struct ReadContext {
    run: Option<RunId>,
    event: Option<EventId>,
    source: Option<SourceId>,
    format: Option<ImageFormat>,
}

impl DrdfReader {
    pub fn new(config: ReadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReadConfig {
        &self.config
    }

    /// Decode a complete file image.
    pub fn read(&self, bytes: &[u8]) -> FormatResult<DrdfStore> {
        self.decode(bytes).map(|(store, _)| store)
    }

    /// Load and decode a file, refusing anything over `max_file_size`.
    pub fn read_file(&self, path: &Path) -> FormatResult<DrdfStore> {
        self.decode_file(path).map(|(store, _)| store)
    }

    /// [`decode`](Self::decode) the file at `path`, honouring `max_file_size`.
    pub fn decode_file(&self, path: &Path) -> FormatResult<(DrdfStore, StreamSummary)> {
        let size = std::fs::metadata(path)?.len();
        if size > self.config.max_file_size {
            return Err(FormatError::FileTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "loaded file");
        self.decode(&bytes)
    }

    /// Decode and also report chunk count, length, and the verified checksum.
    pub fn decode(&self, bytes: &[u8]) -> FormatResult<(DrdfStore, StreamSummary)> {
        check_signature(bytes)?;
        let (chunks, summary) = frame(bytes)?;

        let mut context = ReadContext::default();
        let mut store = DrdfStore::new();
        for chunk in &chunks {
            self.apply(&mut store, &mut context, chunk)?;
        }
        debug!(
            runs = store.len(),
            images = store.image_count(),
            chunks = summary.chunks,
            checksum = summary.checksum,
            "read complete"
        );
        Ok((store, summary))
    }

    fn apply(
        &self,
        store: &mut DrdfStore,
        context: &mut ReadContext,
        chunk: &RawChunk<'_>,
    ) -> FormatResult<()> {
        match chunk.tag {
            ChunkTag::Hraw => chunk.expect_len(0),
            ChunkTag::Eraw => Ok(()),
            ChunkTag::Rccd => {
                warn!(offset = chunk.offset, len = chunk.len(), "skipping legacy RCCD chunk");
                Ok(())
            }
            ChunkTag::Rsta => {
                let id = RunId::from_bytes(fixed::<16>(chunk)?);
                if store.contains_run(&id) {
                    self.duplicate(|| FormatError::DuplicateRun {
                        run: id.to_string(),
                    })?;
                    warn!(run = %id, "duplicate run merged");
                }
                store.run_entry(id);
                debug!(run = %id, offset = chunk.offset, "run");
                context.run = Some(id);
                context.event = None;
                Ok(())
            }
            ChunkTag::Rgeo => {
                let run = require(context.run, chunk, "RSTA")?;
                let georef = text(chunk)?;
                store.run_entry(run).set_georef(georef);
                Ok(())
            }
            ChunkTag::Evnt => {
                let event = u32::from_le_bytes(fixed::<4>(chunk)?);
                let run_id = require(context.run, chunk, "RSTA")?;
                let run = store.run_entry(run_id);
                if run.contains_event(event) {
                    self.duplicate(|| FormatError::DuplicateEvent {
                        run: run_id.to_string(),
                        event,
                    })?;
                    warn!(run = %run_id, event, "duplicate event merged");
                }
                run.event_entry(event);
                debug!(run = %run_id, event, "event");
                context.event = Some(event);
                Ok(())
            }
            ChunkTag::Isrc => {
                context.source = Some(text(chunk)?.to_owned());
                Ok(())
            }
            ChunkTag::Ifmt => {
                let descriptor = fixed::<8>(chunk)?;
                let format = ImageFormat::from_bytes(&descriptor).map_err(|_| {
                    FormatError::InvalidImageFormat {
                        offset: chunk.offset,
                        code: descriptor[4],
                    }
                })?;
                context.format = Some(format);
                Ok(())
            }
            ChunkTag::Idat => self.apply_image(store, context, chunk),
        }
    }

    fn apply_image(
        &self,
        store: &mut DrdfStore,
        context: &ReadContext,
        chunk: &RawChunk<'_>,
    ) -> FormatResult<()> {
        let run_id = require(context.run, chunk, "RSTA")?;
        let event_id = require(context.event, chunk, "EVNT")?;
        let source = require(context.source.as_ref(), chunk, "ISRC")?;
        let format = require(context.format, chunk, "IFMT")?;

        chunk.expect_len(format.size())?;
        let image = Image::from_bytes(format, chunk.payload).map_err(|_| {
            FormatError::InvalidChunkLength {
                tag: chunk.tag,
                offset: chunk.offset,
                length: chunk.len(),
                expected: format.size(),
            }
        })?;

        let event = store.run_entry(run_id).event_entry(event_id);
        if event.contains(source) {
            self.duplicate(|| FormatError::DuplicateImage {
                run: run_id.to_string(),
                event: event_id,
                source_id: source.clone(),
            })?;
            warn!(run = %run_id, event = event_id, source = %source, "duplicate image overwritten");
        }
        event.insert(source.clone(), image);
        Ok(())
    }

    /// Fail under `Reject`; under `Merge` the caller logs and carries on.
    fn duplicate(&self, err: impl FnOnce() -> FormatError) -> FormatResult<()> {
        match self.config.duplicates {
            DuplicatePolicy::Merge => Ok(()),
            DuplicatePolicy::Reject => Err(err()),
        }
    }
}

/// Decode `bytes` with the default configuration.
pub fn read(bytes: &[u8]) -> FormatResult<DrdfStore> {
    DrdfReader::default().read(bytes)
}

/// Load and decode the file at `path`.
pub fn read_file(path: impl AsRef<Path>, config: &ReadConfig) -> FormatResult<DrdfStore> {
    DrdfReader::new(config.clone()).read_file(path.as_ref())
}

fn check_signature(bytes: &[u8]) -> FormatResult<()> {
    if bytes.len() < MIN_FILE_LEN {
        return Err(FormatError::MalformedSignature {
            reason: format!("{} bytes, need at least {MIN_FILE_LEN}", bytes.len()),
        });
    }
    if bytes[..HEADER_LEN] != encode_header(ChunkTag::Hraw, 0) {
        return Err(FormatError::MalformedSignature {
            reason: "missing empty HRAW header".into(),
        });
    }
    Ok(())
}

/// Split `bytes` into chunks up to `ERAW` and check the stored checksum.
///
/// Payloads are not looked at here beyond the trailer's.
fn frame(bytes: &[u8]) -> FormatResult<(Vec<RawChunk<'_>>, StreamSummary)> {
    let mut cursor = ChunkCursor::new(bytes);
    let mut checksum = Checksum::new();
    let mut chunks = Vec::new();

    while let Some(chunk) = cursor.next_chunk()? {
        checksum.update(chunk.header);
        if chunk.tag != ChunkTag::Eraw {
            checksum.update(chunk.payload);
            chunks.push(chunk);
            continue;
        }

        let expected = u32::from_le_bytes(fixed::<4>(&chunk)?);
        let actual = checksum.value();
        if expected != actual {
            return Err(FormatError::ChecksumMismatch { expected, actual });
        }
        if !cursor.is_empty() {
            return Err(FormatError::TrailingData {
                offset: cursor.offset(),
                extra: cursor.remaining().len() as u64,
            });
        }
        let summary = StreamSummary {
            chunks: chunks.len() + 1,
            bytes: cursor.offset(),
            checksum: actual,
        };
        return Ok((chunks, summary));
    }

    Err(FormatError::IncompleteFile)
}

fn fixed<const N: usize>(chunk: &RawChunk<'_>) -> FormatResult<[u8; N]> {
    chunk.expect_len(N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(chunk.payload);
    Ok(out)
}

fn text<'b>(chunk: &RawChunk<'b>) -> FormatResult<&'b str> {
    std::str::from_utf8(chunk.payload).map_err(|_| FormatError::InvalidText {
        tag: chunk.tag,
        offset: chunk.offset,
    })
}

fn require<T>(value: Option<T>, chunk: &RawChunk<'_>, missing: &'static str) -> FormatResult<T> {
    value.ok_or(FormatError::OrphanChunk {
        tag: chunk.tag,
        offset: chunk.offset,
        missing,
    })
}
