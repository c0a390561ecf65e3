use super::*;
use crate::kernels::huffman_tree::HuffmanNode;
use crate::source::MemoryChunkSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Walks the tree bit by bit; test-only check that payloads are decodable.
fn reference_decode(metadata: &HuffmanMetadata, payload: &[u8]) -> Vec<u8> {
    let tree = HuffmanTree::build(&metadata.frequency_table()).unwrap();
    let total_bits = payload.len() * 8 - metadata.padding_bits as usize;
    let mut out = Vec::new();

    if let HuffmanNode::Leaf { symbol, .. } = *tree.node(tree.root()) {
        out.resize(total_bits, symbol);
        return out;
    }

    let mut node = tree.root();
    for bit_index in 0..total_bits {
        let bit = (payload[bit_index / 8] >> (7 - bit_index % 8)) & 1;
        if let HuffmanNode::Internal { left, right, .. } = *tree.node(node) {
            node = if bit == 0 { left } else { right };
        }
        if let HuffmanNode::Leaf { symbol, .. } = *tree.node(node) {
            out.push(symbol);
            node = tree.root();
        }
    }
    out
}

fn random_bytes(len: usize, alphabet: u8, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    // Skewed distribution so code lengths differ.
    (0..len)
        .map(|_| {
            let a = rng.random_range(0..alphabet as u32);
            let b = rng.random_range(0..alphabet as u32);
            a.min(b) as u8
        })
        .collect()
}

fn small_config() -> CodecConfig {
    CodecConfig {
        output_buffer_capacity: 64,
        drain_safety_margin: 8,
        ..CodecConfig::default()
    }
}

fn collect_segments(segments: EncodedSegments<'_>) -> Result<Vec<Vec<u8>>> {
    segments.collect()
}

//==================================================================================
// Whole-buffer mode
//==================================================================================

#[test]
fn test_aaabbc_scenario() {
    let (payload, metadata) = encode(b"AAABBC").unwrap();
    // A=0, C=10, B=11 -> 000 11 11 10 -> 0001_1111 0(000_0000)
    assert_eq!(payload, vec![0b0001_1111, 0b0000_0000]);
    assert_eq!(metadata.padding_bits, 7);
    assert_eq!(
        metadata.frequencies,
        vec![(b'A', 3), (b'B', 2), (b'C', 1)]
    );
    assert_eq!(metadata.compressed_len, 2);
}

#[test]
fn test_empty_input_is_construction_failure() {
    assert!(matches!(encode(&[]), Err(HuffpackError::EmptyInput)));
}

#[test]
fn test_single_symbol_costs_one_bit_each() {
    let (payload, metadata) = encode(&[b'q'; 13]).unwrap();
    assert_eq!(payload.len(), 2);
    assert_eq!(metadata.padding_bits, 3);
    assert_eq!(reference_decode(&metadata, &payload), vec![b'q'; 13]);
}

#[test]
fn test_all_256_symbols_once() {
    let all: Vec<u8> = (0..=255u8).collect();
    let (payload, metadata) = encode(&all).unwrap();
    assert_eq!(metadata.frequencies.len(), 256);
    assert!(metadata.frequencies.iter().all(|&(_, count)| count == 1));
    assert_eq!(payload.len(), 256);
    assert_eq!(metadata.padding_bits, 0);
    assert_eq!(reference_decode(&metadata, &payload), all);
}

#[test]
fn test_payload_decodes_for_random_inputs() {
    for (len, alphabet, seed) in [(1usize, 2u8, 1u64), (7, 3, 2), (4099, 40, 3), (30_000, 255, 4)] {
        let data = random_bytes(len, alphabet, seed);
        let (payload, metadata) = encode(&data).unwrap();
        assert_eq!(reference_decode(&metadata, &payload), data, "len {}", len);
    }
}

#[test]
fn test_padding_is_zero_only_on_byte_boundary() {
    for len in 1..40usize {
        let data = random_bytes(len, 5, len as u64);
        let (payload, metadata) = encode(&data).unwrap();
        let total_bits = metadata.code_table().unwrap().total_bits(&metadata.frequency_table());
        assert!(metadata.padding_bits <= 7);
        assert_eq!(metadata.padding_bits == 0, total_bits % 8 == 0);
        assert_eq!(payload.len() as u64, padded_len(total_bits));
    }
}

//==================================================================================
// Streaming mode
//==================================================================================

#[test]
fn test_stream_matches_whole_buffer_output() {
    let data = random_bytes(10_000, 60, 11);
    let (expected_payload, expected_meta) = encode(&data).unwrap();

    for chunk_size in [1usize, 3, 100, 4096, 20_000] {
        let source = MemoryChunkSource::new(&data, chunk_size);
        let (metadata, segments) = encode_stream(&source, &small_config()).unwrap();
        let payload: Vec<u8> = collect_segments(segments).unwrap().concat();

        assert_eq!(payload, expected_payload, "chunk size {}", chunk_size);
        assert_eq!(metadata.frequencies, expected_meta.frequencies);
        assert_eq!(metadata.padding_bits, expected_meta.padding_bits);
        assert_eq!(metadata, expected_meta);
    }
}

#[test]
fn test_stream_emits_bounded_segments() {
    let data = random_bytes(5_000, 200, 21);
    let source = MemoryChunkSource::new(&data, 512);
    let config = small_config();
    let (metadata, segments) = encode_stream(&source, &config).unwrap();
    let segments = collect_segments(segments).unwrap();

    assert!(segments.len() > 1);
    // Draining triggers within the margin; one write adds at most 8 bytes.
    assert!(segments
        .iter()
        .all(|s| s.len() <= config.output_buffer_capacity));
    let total: usize = segments.iter().map(Vec::len).sum();
    assert_eq!(total as u64, metadata.compressed_len);
}

#[test]
fn test_analytic_bit_count_matches_writer() {
    let data = random_bytes(3_333, 17, 5);
    let freqs = frequency::count(&data);
    let table = build_code_table(&freqs).unwrap();

    let mut writer = BitWriter::new(16, 0);
    write_symbols(&mut writer, &table, &data);
    assert_eq!(writer.bits_written(), table.total_bits(&freqs));
}

#[test]
fn test_stream_never_yields_empty_segments() {
    let data = random_bytes(2_000, 90, 31);
    let source = MemoryChunkSource::new(&data, 3);
    let config = CodecConfig {
        output_buffer_capacity: 9,
        drain_safety_margin: 8,
        ..CodecConfig::default()
    };
    let (metadata, segments) = encode_stream(&source, &config).unwrap();
    let segments = collect_segments(segments).unwrap();

    assert!(segments.len() > 1);
    assert!(segments.iter().all(|s| !s.is_empty()));
    assert_eq!(segments.concat(), encode(&data).unwrap().0);
    assert_eq!(segments.iter().map(Vec::len).sum::<usize>() as u64, metadata.compressed_len);
}

#[test]
fn test_stream_rejects_invalid_config() {
    let source = MemoryChunkSource::new(b"twelve bytes", 3);
    let config = CodecConfig {
        output_buffer_capacity: 0,
        drain_safety_margin: 0,
        ..CodecConfig::default()
    };
    let result = encode_stream(&source, &config);
    assert!(matches!(result, Err(HuffpackError::InvalidConfig(_))));
}

#[test]
fn test_stream_empty_source_fails() {
    let source = MemoryChunkSource::from_chunks(vec![Vec::new(), Vec::new()]);
    let result = encode_stream(&source, &CodecConfig::default());
    assert!(matches!(result, Err(HuffpackError::EmptyInput)));
}

#[test]
fn test_stream_ignores_empty_chunks() {
    let source = MemoryChunkSource::from_chunks(vec![
        Vec::new(),
        b"AAA".to_vec(),
        Vec::new(),
        b"BBC".to_vec(),
    ]);
    let (metadata, segments) = encode_stream(&source, &CodecConfig::default()).unwrap();
    let payload = collect_segments(segments).unwrap().concat();
    assert_eq!(payload, vec![0b0001_1111, 0b0000_0000]);
    assert_eq!(metadata.padding_bits, 7);
    assert_eq!(metadata.compressed_len, 2);
}

/// A source that serves different bytes on its second pass.
struct ShiftingSource {
    passes: std::cell::Cell<u32>,
    second: Vec<u8>,
}

impl ChunkSource for ShiftingSource {
    fn open_pass(&self) -> Result<ChunkPass<'_>> {
        let pass = self.passes.get();
        self.passes.set(pass + 1);
        let data = if pass == 0 { b"AAABBC".to_vec() } else { self.second.clone() };
        Ok(Box::new(std::iter::once(Ok(data))))
    }
}

#[test]
fn test_stream_detects_unseen_symbol_on_second_pass() {
    let source = ShiftingSource {
        passes: std::cell::Cell::new(0),
        second: b"AAXBBC".to_vec(),
    };
    let (_, segments) = encode_stream(&source, &CodecConfig::default()).unwrap();
    let result = collect_segments(segments);
    assert!(matches!(result, Err(HuffpackError::SourceMismatch(_))));
}

#[test]
fn test_stream_detects_length_change_on_second_pass() {
    let source = ShiftingSource {
        passes: std::cell::Cell::new(0),
        second: b"AAABB".to_vec(),
    };
    let (_, segments) = encode_stream(&source, &CodecConfig::default()).unwrap();
    let result = collect_segments(segments);
    assert!(matches!(result, Err(HuffpackError::SourceMismatch(_))));
}

#[test]
fn test_stream_stops_after_error() {
    let source = ShiftingSource {
        passes: std::cell::Cell::new(0),
        second: b"Z".to_vec(),
    };
    let (_, mut segments) = encode_stream(&source, &CodecConfig::default()).unwrap();
    assert!(matches!(segments.next(), Some(Err(_))));
    assert!(segments.next().is_none());
}
