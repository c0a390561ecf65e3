use super::*;
use crate::config::{CodecConfig, ContainerVersion};
use crate::error::HuffpackError;
use crate::kernels::huffman;
use crate::source::{FileChunkSource, MemoryChunkSource};
use crate::traits::Codec;
use std::io::Cursor;

fn codec(version: ContainerVersion) -> HuffmanCodec {
    HuffmanCodec::new(CodecConfig {
        output_buffer_capacity: 128,
        drain_safety_margin: 16,
        read_segment_size: 5,
        container_version: version,
        ..CodecConfig::default()
    })
    .unwrap()
}

/// Every byte value once, in a scrambled order.
fn all_symbols() -> Vec<u8> {
    (0..=255u8).map(|i| i.wrapping_mul(167).wrapping_add(13)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario Test:**
    /// "AAABBC" in the original layout is exactly 23 bytes.
    #[test]
    fn test_aaabbc_v1_container_bytes() -> Result<(), HuffpackError> {
        let bytes = codec(ContainerVersion::V1).compress_to_container(b"AAABBC")?;
        let expected = vec![
            b'H', b'U', b'F', b'F', // magic
            0, 1, // version
            7, // padding bits
            3, // freq count
            b'A', 0, 3, //
            b'B', 0, 2, //
            b'C', 0, 1, //
            0, 0, 0, 2, // payload length
            0b0001_1111, 0b0000_0000,
        ];
        assert_eq!(bytes.len(), 23);
        assert_eq!(bytes, expected);
        Ok(())
    }

    #[test]
    fn test_aaabbc_v2_container_bytes() -> Result<(), HuffpackError> {
        let bytes = codec(ContainerVersion::V2).compress_to_container(b"AAABBC")?;
        let expected = vec![
            b'H', b'U', b'F', b'F', 0, 2, 7, 0, 3, //
            b'A', 0, 0, 0, 3, //
            b'B', 0, 0, 0, 2, //
            b'C', 0, 0, 0, 1, //
            0, 0, 0, 2, 0b0001_1111, 0b0000_0000,
        ];
        assert_eq!(bytes, expected);
        Ok(())
    }

    #[test]
    fn test_buffered_container_round_trip() -> Result<(), HuffpackError> {
        let codec = codec(ContainerVersion::V2);
        let input = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let bytes = codec.compress_to_container(&input)?;

        let (metadata, payload) = codec.read_container(&bytes)?;
        let (expected_payload, expected_metadata) = huffman::encode(&input)?;
        assert_eq!(metadata, expected_metadata);
        assert_eq!(payload, expected_payload);
        Ok(())
    }

    /// **Scenario Test:**
    /// 256 distinct symbols need a 2-byte entry count.
    #[test]
    fn test_all_symbols_fit_only_in_v2() -> Result<(), HuffpackError> {
        let input = all_symbols();

        let bytes = codec(ContainerVersion::V2).compress_to_container(&input)?;
        let (metadata, payload) = read_container(&bytes)?;
        assert_eq!(metadata.frequencies.len(), 256);
        assert!(metadata.frequencies.iter().all(|&(_, count)| count == 1));
        assert_eq!(payload.len(), 256);
        assert_eq!(metadata.padding_bits, 0);

        let result = codec(ContainerVersion::V1).compress_to_container(&input);
        assert!(matches!(
            result,
            Err(HuffpackError::FieldOverflow { value: 256, width: 1, .. })
        ));
        Ok(())
    }

    /// **Edge Case Test:**
    /// A count above 65535 cannot be written in the original layout.
    #[test]
    fn test_large_count_overflows_v1() -> Result<(), HuffpackError> {
        let input = vec![b'z'; 70_000];
        let result = codec(ContainerVersion::V1).compress_to_container(&input);
        assert!(matches!(
            result,
            Err(HuffpackError::FieldOverflow { value: 70_000, width: 2, .. })
        ));

        let bytes = codec(ContainerVersion::V2).compress_to_container(&input)?;
        let (metadata, payload) = read_container(&bytes)?;
        assert_eq!(metadata.frequencies, vec![(b'z', 70_000)]);
        assert_eq!(payload.len(), 8750);
        Ok(())
    }

    /// **Edge Case Test:**
    /// No container exists for empty input, in either mode.
    #[test]
    fn test_empty_input_produces_no_container() {
        let codec = codec(ContainerVersion::V2);
        assert!(matches!(
            codec.compress_to_container(&[]),
            Err(HuffpackError::EmptyInput)
        ));

        let mut sink = Vec::new();
        let source = MemoryChunkSource::from_chunks(vec![vec![], vec![]]);
        assert!(matches!(
            codec.compress_stream_to_writer(&source, &mut sink),
            Err(HuffpackError::EmptyInput)
        ));
        assert!(sink.is_empty());
    }

    /// **Primary Streaming Integration Test:**
    /// The streamed container is byte-identical to the buffered one, and reading
    /// it back in segments yields the same payload with the length reported.
    #[test]
    fn test_streamed_container_round_trip() -> Result<(), HuffpackError> {
        for version in [ContainerVersion::V1, ContainerVersion::V2] {
            // --- ARRANGE ---
            let codec = codec(version);
            let input: Vec<u8> = (0..5000u32).map(|i| ((i * i) % 37) as u8).collect();
            let source = MemoryChunkSource::new(&input, 333);

            // --- ACT ---
            let mut streamed = Vec::new();
            let written = codec.compress_stream_to_writer(&source, &mut streamed)?;
            let buffered = codec.compress_to_container(&input)?;

            let (metadata, segments) = codec.read_container_streamed(Cursor::new(streamed.clone()))?;
            let segments: Vec<Vec<u8>> = segments.collect::<Result<_, _>>()?;

            // --- ASSERT ---
            assert_eq!(streamed, buffered);
            assert_eq!(written, streamed.len() as u64);
            assert!(segments.iter().all(|s| s.len() <= 5));

            let (expected_payload, expected_metadata) = huffman::encode(&input)?;
            assert_eq!(metadata, expected_metadata);
            assert_eq!(segments.concat(), expected_payload);
        }
        Ok(())
    }

    /// **Round-Trip Test:**
    /// Metadata survives a container regardless of how it was encoded and how
    /// the container is written and read back.
    #[test]
    fn test_metadata_round_trips_across_payload_modes() -> Result<(), HuffpackError> {
        // --- ARRANGE ---
        let codec = codec(ContainerVersion::V2);
        let descriptor = descriptor(ContainerVersion::V2)?;
        let input = b"AAABBC";
        let (buffered_payload, buffered_meta) = huffman::encode(input)?;
        let source = MemoryChunkSource::new(input, 2);

        // --- ACT: streamed encode, buffered write, buffered read ---
        let (streamed_meta, segments) = codec.encode_stream(&source)?;
        let streamed_payload: Vec<u8> = segments.collect::<Result<Vec<_>, _>>()?.concat();
        let bytes = crate::framing::serialize(&descriptor, &streamed_meta, &streamed_payload)?;
        let (restored, payload) = read_container(&bytes)?;

        // --- ASSERT ---
        assert_eq!(restored, streamed_meta);
        assert_eq!(payload, streamed_payload);

        // --- ACT: buffered encode, streamed write, streamed read ---
        let mut sink = Vec::new();
        crate::framing::serialize_streamed(
            &descriptor,
            &buffered_meta,
            buffered_meta.compressed_len,
            buffered_payload.chunks(1).map(|c| Ok(c.to_vec())),
            &mut sink,
        )?;
        let (restored, segments) = read_container_streamed(Cursor::new(sink), 1)?;
        let payload: Vec<u8> = segments.collect::<Result<Vec<_>, _>>()?.concat();

        // --- ASSERT ---
        assert_eq!(restored, buffered_meta);
        assert_eq!(payload, buffered_payload);
        assert_eq!(restored, streamed_meta);
        Ok(())
    }

    #[test]
    fn test_encode_stream_metadata_matches_streamed_read() -> Result<(), HuffpackError> {
        let codec = codec(ContainerVersion::V2);
        let source = MemoryChunkSource::new(b"mississippi river", 4);
        let (metadata, _segments) = codec.encode_stream(&source)?;

        let mut sink = Vec::new();
        codec.compress_stream_to_writer(&source, &mut sink)?;
        let (restored, _) = codec.read_container_streamed(Cursor::new(sink))?;
        assert_eq!(restored, metadata);
        Ok(())
    }

    #[test]
    fn test_compress_file_matches_buffered() -> Result<(), HuffpackError> {
        let path = std::env::temp_dir().join(format!("huffpack_bridge_{}.bin", std::process::id()));
        let input: Vec<u8> = (0..10_000u32).map(|i| (i % 97) as u8 ^ (i / 1000) as u8).collect();
        std::fs::write(&path, &input)?;

        let codec = HuffmanCodec::new(CodecConfig {
            source_chunk_size: 1000,
            ..CodecConfig::default()
        })?;
        let mut sink = Vec::new();
        let result = codec.compress_file(&path, &mut sink);
        std::fs::remove_file(&path)?;

        result?;
        assert_eq!(sink, codec.compress_to_container(&input)?);

        // The file is gone now: an io error and nothing written.
        let mut sink = Vec::new();
        let missing = codec.compress_stream_to_writer(&FileChunkSource::new(&path, 10), &mut sink);
        assert!(matches!(missing, Err(HuffpackError::Io(_))));
        assert!(sink.is_empty());
        Ok(())
    }

    #[test]
    fn test_truncated_container_is_reported() -> Result<(), HuffpackError> {
        let bytes = codec(ContainerVersion::V2).compress_to_container(b"truncate me please")?;
        let cut = &bytes[..bytes.len() - 1];
        assert!(matches!(
            read_container(cut),
            Err(HuffpackError::Truncated { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_decode_is_unimplemented() -> Result<(), HuffpackError> {
        let codec = HuffmanCodec::default();
        assert_eq!(codec.name(), "huffman");

        let encoded = codec.encode(b"AAABBC")?;
        assert_eq!(encoded.payload.len(), 2);
        assert!(matches!(
            codec.decode(&encoded.metadata, &encoded.payload),
            Err(HuffpackError::Unimplemented(_))
        ));
        Ok(())
    }

    #[test]
    fn test_codec_rejects_invalid_config() {
        let result = HuffmanCodec::new(CodecConfig {
            drain_safety_margin: 0,
            ..CodecConfig::default()
        });
        assert!(matches!(result, Err(HuffpackError::InvalidConfig(_))));
    }
}
