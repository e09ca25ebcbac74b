//! Chunked binary codec for the Detector Response Data Format.
//!
//! A DRDF file is a flat sequence of chunks, each a little-endian `u32`
//! payload length, a four-byte ASCII tag, and the payload:
//!
//! ```text
//! [00000000 "HRAW"]                         header, always first
//! [len "RSTA" run-id] [len "RGEO" georef]   per run
//! [len "EVNT" event-id]                     per event
//! [len "ISRC" source] [len "IFMT" format] [len "IDAT" pixels]   per image
//! [00000004 "ERAW" crc32]                   trailer, always last
//! ```
//!
//! The trailer's CRC-32 covers every preceding byte of the file, including
//! the trailer's own eight-byte header, and starts from `0xFFFFFFFF`.
//!
//! # Architecture
//!
//! - **`checksum`**: chainable CRC-32 state
//! - **`chunk`**: tag registry and bounds-checked chunk framing
//! - **`DrdfReader`**: framing and checksum pass, then a decode pass with
//!   configurable duplicate handling
//! - **`DrdfWriter`**: encoder over any `io::Write` sink

pub mod checksum;
pub mod chunk;
pub mod config;
pub mod error;
pub mod reader;
pub mod writer;

pub use checksum::Checksum;
pub use chunk::{ChunkCursor, ChunkTag, RawChunk};
pub use config::{DuplicatePolicy, ReadConfig};
pub use error::{FormatError, FormatResult};
pub use reader::{read, read_file, DrdfReader};
pub use writer::{encoded_len, to_bytes, write_file, DrdfWriter};

/// What a completed read or write saw of the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamSummary {
    /// Chunks including header and trailer.
    pub chunks: usize,
    pub bytes: u64,
    /// The CRC-32 stored in the trailer.
    pub checksum: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use drdf_store::DrdfStore;
    use drdf_types::{Image, ImageFormat, PixelAu16, PixelType, RunId};
    use proptest::prelude::*;

    const SCENARIO_RUN: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

    fn scenario() -> DrdfStore {
        let mut store = DrdfStore::new();
        store.start_run(SCENARIO_RUN.parse().unwrap());
        store.set_georef("geo://test").unwrap();
        store.start_event(42).unwrap();
        let image = Image::from_bytes(ImageFormat::new(2, 2, PixelType::Au8), &[1, 2, 3, 4]).unwrap();
        store.add_image("S1", &image).unwrap();
        store
    }

    /// Offsets and lengths of every chunk in `bytes`.
    fn layout(bytes: &[u8]) -> Vec<(ChunkTag, usize, usize)> {
        let mut out = Vec::new();
        let mut cursor = ChunkCursor::new(bytes);
        while let Some(chunk) = cursor.next_chunk().unwrap() {
            out.push((chunk.tag, chunk.offset as usize, chunk.payload.len()));
        }
        out
    }

    #[test]
    fn scenario_roundtrip() {
        let bytes = to_bytes(&scenario()).unwrap();
        assert_eq!(bytes.len(), 112);
        assert_eq!(&bytes[bytes.len() - 12..bytes.len() - 4], b"\x04\x00\x00\x00ERAW");
        assert_eq!(&bytes[bytes.len() - 4..], &0xaef4_b832u32.to_le_bytes());

        let store = read(&bytes).unwrap();
        assert_eq!(store.len(), 1);
        let run_id: RunId = SCENARIO_RUN.parse().unwrap();
        let run = store.run(&run_id).unwrap();
        assert_eq!(run.georef(), "geo://test");
        assert_eq!(run.len(), 1);
        let event = run.event(42).unwrap();
        assert_eq!(event.len(), 1);
        let image = event.get("S1").unwrap();
        assert_eq!(image.size(), 4);
        assert_eq!(image.as_bytes(), &[1, 2, 3, 4]);
        assert_eq!(store, scenario());
    }

    #[test]
    fn run_id_bytes_in_rfc_order() {
        let bytes = to_bytes(&scenario()).unwrap();
        assert_eq!(&bytes[8..16], b"\x10\x00\x00\x00RSTA");
        assert_eq!(
            &bytes[16..32],
            &[
                0x6b, 0xa7, 0xb8, 0x10, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4,
                0x30, 0xc8
            ]
        );
    }

    #[test]
    fn empty_run_roundtrip() {
        let mut store = DrdfStore::new();
        store.start_run(RunId::from_bytes(core::array::from_fn(|i| i as u8)));
        store.set_georef("geo://empty").unwrap();
        let decoded = read(&to_bytes(&store).unwrap()).unwrap();
        let (_, run) = decoded.runs().next().unwrap();
        assert_eq!(run.georef(), "geo://empty");
        assert!(run.is_empty());
        assert_eq!(decoded, store);
    }

    #[test]
    fn mixed_pixel_types_roundtrip() {
        let mut store = DrdfStore::new();
        store.start_run(RunId::from_bytes([9; 16]));
        for event in [3u32, 1, 2] {
            store.start_event(event).unwrap();
            for pixel_type in PixelType::ALL {
                let mut image = Image::new(ImageFormat::new(3, 2, pixel_type));
                for (i, b) in image.as_bytes_mut().iter_mut().enumerate() {
                    *b = (i as u32 * 7 + event) as u8;
                }
                store.move_image(format!("SRC_{pixel_type}"), &mut image).unwrap();
            }
        }
        let bytes = to_bytes(&store).unwrap();
        let decoded = read(&bytes).unwrap();
        assert_eq!(decoded, store);
        let order: Vec<u32> = decoded.images().map(|e| e.event).collect();
        assert!(order.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn idat_must_match_format_size() {
        let format = ImageFormat::new(3, 2, PixelType::Au16);
        assert_eq!(format.size(), 12);

        for len in [11usize, 13] {
            let mut writer = DrdfWriter::new(Vec::new());
            writer.write_chunk(ChunkTag::Hraw, &[]).unwrap();
            writer.write_chunk(ChunkTag::Rsta, &[1; 16]).unwrap();
            writer.write_chunk(ChunkTag::Evnt, &1u32.to_le_bytes()).unwrap();
            writer.write_chunk(ChunkTag::Isrc, b"S1").unwrap();
            writer.write_chunk(ChunkTag::Ifmt, &format.to_bytes()).unwrap();
            writer.write_chunk(ChunkTag::Idat, &vec![0; len]).unwrap();
            writer.finish().unwrap();
            let bytes = writer.into_inner();

            match read(&bytes).unwrap_err() {
                FormatError::InvalidChunkLength {
                    tag,
                    length,
                    expected,
                    ..
                } => {
                    assert_eq!(tag, ChunkTag::Idat);
                    assert_eq!(length as usize, len);
                    assert_eq!(expected, 12);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    /// The scenario with a legacy `RCCD` chunk after the header, so every
    /// tag with a payload appears once.
    fn scenario_with_rccd() -> Vec<u8> {
        let scenario = to_bytes(&scenario()).unwrap();
        let mut writer = DrdfWriter::new(Vec::new());
        writer.write_chunk(ChunkTag::Hraw, &[]).unwrap();
        writer.write_chunk(ChunkTag::Rccd, b"legacy").unwrap();
        for (tag, offset, len) in layout(&scenario) {
            if matches!(tag, ChunkTag::Hraw | ChunkTag::Eraw) {
                continue;
            }
            let start = offset + chunk::HEADER_LEN;
            writer.write_chunk(tag, &scenario[start..start + len]).unwrap();
        }
        writer.finish().unwrap();
        writer.into_inner()
    }

    #[test]
    fn truncated_payload_names_length() {
        let bytes = scenario_with_rccd();
        assert_eq!(read(&bytes).unwrap(), scenario());

        let mut seen = Vec::new();
        for (tag, offset, len) in layout(&bytes) {
            if len == 0 {
                continue;
            }
            seen.push(tag);
            let cut = offset + chunk::HEADER_LEN + len - 1;
            match read(&bytes[..cut]).unwrap_err() {
                FormatError::ChunkOutOfRange {
                    tag: t,
                    length,
                    remaining,
                    ..
                } => {
                    assert_eq!(t, tag);
                    assert_eq!(length as usize, len);
                    assert_eq!(remaining as usize, len - 1);
                }
                other => panic!("{tag}: unexpected error: {other}"),
            }
        }
        let expected: Vec<ChunkTag> = ChunkTag::ALL
            .into_iter()
            .filter(|tag| *tag != ChunkTag::Hraw)
            .collect();
        assert!(expected.iter().all(|tag| seen.contains(tag)));
    }

    #[test]
    fn checksum_flip_detected() {
        let mut bytes = to_bytes(&scenario()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(matches!(
            read(&bytes),
            Err(FormatError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn payload_flip_is_checksum_mismatch() {
        let bytes = to_bytes(&scenario()).unwrap();
        let start = |tag: ChunkTag| {
            let (_, offset, _) = layout(&bytes)
                .into_iter()
                .find(|(t, _, _)| *t == tag)
                .unwrap();
            offset + chunk::HEADER_LEN
        };
        let flips = [
            (start(ChunkTag::Idat), 0xff),
            // Lead byte with no continuation.
            (start(ChunkTag::Isrc), 0x80),
            (start(ChunkTag::Rgeo), 0x80),
            // Pixel type code 0 becomes 64.
            (start(ChunkTag::Ifmt) + 4, 0x40),
            (start(ChunkTag::Rsta) + 3, 0x01),
        ];
        for (at, mask) in flips {
            let mut damaged = bytes.clone();
            damaged[at] ^= mask;
            match read(&damaged).unwrap_err() {
                FormatError::ChecksumMismatch { expected, actual } => {
                    assert_eq!(expected, 0xaef4_b832);
                    assert_ne!(actual, expected);
                }
                other => panic!("byte {at}: unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn typed_pixels_survive_roundtrip() {
        let pixels: Vec<PixelAu16> = (0..6u16)
            .map(|i| PixelAu16 { amplitude: i * 1000 })
            .collect();
        let mut store = DrdfStore::new();
        store.start_run(RunId::from_bytes([5; 16]));
        store.start_event(1).unwrap();
        store
            .add_image("CAM", &Image::from_pixels(3, 2, &pixels).unwrap())
            .unwrap();

        let decoded = read(&to_bytes(&store).unwrap()).unwrap();
        let image = decoded.find(&RunId::from_bytes([5; 16]), 1, "CAM").unwrap();
        assert_eq!(image.pixel::<PixelAu16>(2, 1).unwrap().amplitude, 5000);
        assert_eq!(image.amplitude_sum(), 15000.0);
    }

    #[test]
    fn disk_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.drdf");

        let summary = write_file(&scenario(), &path).unwrap();
        assert_eq!(summary.bytes, 112);
        assert_eq!(summary.checksum, 0xaef4_b832);
        assert_eq!(std::fs::read(&path).unwrap(), to_bytes(&scenario()).unwrap());

        let store = read_file(&path, &ReadConfig::default()).unwrap();
        assert_eq!(store, scenario());
    }

    #[test]
    fn read_file_enforces_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.drdf");
        write_file(&scenario(), &path).unwrap();

        let config = ReadConfig {
            max_file_size: 100,
            ..Default::default()
        };
        assert!(matches!(
            read_file(&path, &config),
            Err(FormatError::FileTooLarge { size: 112, max: 100 })
        ));
    }

    #[test]
    fn read_file_missing_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(dir.path().join("absent.drdf"), &ReadConfig::default()).unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }

    fn arb_image() -> impl Strategy<Value = Image> {
        (0u16..5, 0u16..5, 0usize..PixelType::ALL.len()).prop_flat_map(|(w, h, t)| {
            let format = ImageFormat::new(w, h, PixelType::ALL[t]);
            proptest::collection::vec(any::<u8>(), format.size())
                .prop_map(move |bytes| Image::from_vec(format, bytes).unwrap())
        })
    }

    fn arb_store() -> impl Strategy<Value = DrdfStore> {
        let event = proptest::collection::btree_map("[A-Z0-9_]{0,12}", arb_image(), 0..4);
        let run = (
            "[ -~]{0,24}",
            proptest::collection::btree_map(any::<u32>(), event, 0..4),
        );
        proptest::collection::btree_map(any::<[u8; 16]>(), run, 0..3).prop_map(|runs| {
            let mut store = DrdfStore::new();
            for (id, (georef, events)) in runs {
                let run = store.run_entry(RunId::from_bytes(id));
                run.set_georef(georef);
                for (event_id, images) in events {
                    let event = run.event_entry(event_id);
                    for (source, image) in images {
                        event.insert(source, image);
                    }
                }
            }
            store
        })
    }

    proptest! {
        #[test]
        fn roundtrip_preserves_store(store in arb_store()) {
            let bytes = to_bytes(&store).unwrap();
            prop_assert_eq!(bytes.len(), encoded_len(&store));
            let decoded = read(&bytes).unwrap();
            prop_assert_eq!(&decoded, &store);
            let before: Vec<_> = store.images().map(|e| (*e.run, e.event, e.source)).collect();
            let after: Vec<_> = decoded.images().map(|e| (*e.run, e.event, e.source)).collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn any_flipped_byte_fails(store in arb_store(), pick in any::<prop::sample::Index>(), mask in 1u8..) {
            let mut bytes = to_bytes(&store).unwrap();
            let in_payload = |at: usize| {
                layout(&bytes).into_iter().any(|(tag, offset, len)| {
                    let start = offset + chunk::HEADER_LEN;
                    tag != ChunkTag::Eraw && (start..start + len).contains(&at)
                })
            };
            // Between the header and the checksum payload.
            let span = bytes.len() - 4 - chunk::HEADER_LEN;
            let at = chunk::HEADER_LEN + pick.index(span);
            let payload_byte = in_payload(at);
            bytes[at] ^= mask;
            let result = read(&bytes);
            if payload_byte {
                prop_assert!(matches!(result, Err(FormatError::ChecksumMismatch { .. })), "{:?}", result);
            } else {
                prop_assert!(result.is_err());
            }
        }
    }
}
