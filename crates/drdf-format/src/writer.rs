use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use drdf_store::{DrdfStore, Event, Run};
use drdf_types::{EventId, Image, RunId};
use tracing::debug;

use crate::checksum::Checksum;
use crate::chunk::{encode_header, ChunkTag, HEADER_LEN};
use crate::error::{FormatError, FormatResult};
use crate::StreamSummary;

/// Encodes a [`DrdfStore`] into any [`Write`] sink.
///
/// The checksum accumulates over every byte handed to the sink, in emission
/// order, so the trailer is produced without a second pass.
pub struct DrdfWriter<W: Write> {
    sink: W,
    checksum: Checksum,
    bytes_written: u64,
    chunks: usize,
    finished: bool,
}

impl<W: Write> DrdfWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            checksum: Checksum::new(),
            bytes_written: 0,
            chunks: 0,
            finished: false,
        }
    }

    /// Bytes handed to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Emit one complete file for `store`: header, every run, trailer.
    pub fn write_store(&mut self, store: &DrdfStore) -> FormatResult<StreamSummary> {
        self.write_chunk(ChunkTag::Hraw, &[])?;
        for (id, run) in store.runs() {
            self.write_run(id, run)?;
        }
        let checksum = self.finish()?;
        let summary = StreamSummary {
            chunks: self.chunks,
            bytes: self.bytes_written,
            checksum,
        };
        debug!(
            runs = store.len(),
            images = store.image_count(),
            chunks = summary.chunks,
            bytes = summary.bytes,
            checksum,
            "write complete"
        );
        Ok(summary)
    }

    /// Frame and emit a single chunk.
    ///
    /// `ERAW` is refused here; the trailer comes only from [`finish`](Self::finish).
    pub fn write_chunk(&mut self, tag: ChunkTag, payload: &[u8]) -> FormatResult<()> {
        if self.finished {
            return Err(FormatError::WriterFinished);
        }
        if tag == ChunkTag::Eraw {
            return Err(FormatError::ReservedTag { tag });
        }
        let len = u32::try_from(payload.len()).map_err(|_| FormatError::PayloadTooLarge {
            tag,
            len: payload.len(),
        })?;
        let header = encode_header(tag, len);
        self.emit(&header)?;
        self.emit(payload)?;
        self.chunks += 1;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_run(&mut self, id: &RunId, run: &Run) -> FormatResult<()> {
        debug!(run = %id, events = run.len(), "writing run");
        self.write_chunk(ChunkTag::Rsta, id.as_bytes())?;
        self.write_chunk(ChunkTag::Rgeo, run.georef().as_bytes())?;
        for (event_id, event) in run.events() {
            self.write_event(*event_id, event)?;
        }
        Ok(())
    }

    fn write_event(&mut self, id: EventId, event: &Event) -> FormatResult<()> {
        self.write_chunk(ChunkTag::Evnt, &id.to_le_bytes())?;
        for (source, image) in event.images() {
            self.write_image(source, image)?;
        }
        Ok(())
    }

    fn write_image(&mut self, source: &str, image: &Image) -> FormatResult<()> {
        self.write_chunk(ChunkTag::Isrc, source.as_bytes())?;
        self.write_chunk(ChunkTag::Ifmt, &image.format().to_bytes())?;
        self.write_chunk(ChunkTag::Idat, image.as_bytes())
    }

    /// Emit the `ERAW` trailer and flush, returning the checksum written.
    ///
    /// The trailer's own header is covered by the checksum it carries. Used
    /// directly only when chunks were emitted by hand with `write_chunk`.
    /// A second call fails with [`FormatError::WriterFinished`].
    pub fn finish(&mut self) -> FormatResult<u32> {
        if self.finished {
            return Err(FormatError::WriterFinished);
        }
        self.finished = true;
        let header = encode_header(ChunkTag::Eraw, 4);
        self.emit(&header)?;
        let checksum = self.checksum.value();
        self.sink.write_all(&checksum.to_le_bytes())?;
        self.bytes_written += 4;
        self.chunks += 1;
        self.sink.flush()?;
        Ok(checksum)
    }

    fn emit(&mut self, bytes: &[u8]) -> FormatResult<()> {
        self.sink.write_all(bytes)?;
        self.checksum.update(bytes);
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

/// Encode `store` into a fresh buffer.
pub fn to_bytes(store: &DrdfStore) -> FormatResult<Vec<u8>> {
    let mut writer = DrdfWriter::new(Vec::with_capacity(encoded_len(store)));
    writer.write_store(store)?;
    Ok(writer.into_inner())
}

/// Encode `store` to the file at `path`, replacing any existing file.
pub fn write_file(store: &DrdfStore, path: impl AsRef<Path>) -> FormatResult<StreamSummary> {
    let path = path.as_ref();
    let mut writer = DrdfWriter::new(BufWriter::new(File::create(path)?));
    let summary = writer.write_store(store)?;
    debug!(path = %path.display(), bytes = summary.bytes, "file written");
    Ok(summary)
}

/// Exact encoded size of `store`.
pub fn encoded_len(store: &DrdfStore) -> usize {
    let mut len = 2 * HEADER_LEN + 4;
    for (_, run) in store.runs() {
        len += 2 * HEADER_LEN + 16 + run.georef().len();
        for (_, event) in run.events() {
            len += HEADER_LEN + 4;
            for (source, image) in event.images() {
                len += 3 * HEADER_LEN + source.len() + 8 + image.size();
            }
        }
    }
    len
}
