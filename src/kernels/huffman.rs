//! This module contains the Huffman encoding kernels.
//!
//! Two addressing modes share the same tree and code-table construction:
//!
//! * `encode` works on a fully materialised buffer and returns the whole
//!   compressed payload at once.
//! * `encode_stream` reads a restartable `ChunkSource` twice. The first pass
//!   counts frequencies; the exact output size and padding are then computed
//!   from the code table alone, so the metadata is known before any payload is
//!   produced. The second pass feeds the bit writer and hands back output
//!   segments lazily through `EncodedSegments`.

use crate::config::CodecConfig;
use crate::error::{HuffpackError, Result};
use crate::kernels::bit_writer::{padded_len, padding_for, BitWriter};
use crate::kernels::code_table::CodeTable;
use crate::kernels::frequency::{self, FrequencyTable};
use crate::kernels::huffman_tree::HuffmanTree;
use crate::traits::{ChunkPass, ChunkSource};

/// Everything needed to rebuild the code table, plus framing data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanMetadata {
    /// Non-zero symbol counts in ascending symbol order.
    pub frequencies: Vec<(u8, u64)>,
    /// Low bits of the final payload byte that carry no data (0-7).
    pub padding_bits: u8,
    /// Payload size in bytes, as written in the container's length prefix.
    pub compressed_len: u64,
}

impl HuffmanMetadata {
    /// Expands the sparse frequency list back into a full table.
    pub fn frequency_table(&self) -> FrequencyTable {
        frequency::from_entries(&self.frequencies)
    }

    /// Rebuilds the code table the payload was encoded with.
    pub fn code_table(&self) -> Result<CodeTable> {
        build_code_table(&self.frequency_table())
    }
}

/// Tree construction followed by code-table generation.
pub fn build_code_table(freqs: &FrequencyTable) -> Result<CodeTable> {
    let tree = HuffmanTree::build(freqs)?;
    log_metric!(
        "event" = "tree_built",
        "distinct_symbols" = tree.leaf_count(),
        "total_symbols" = tree.frequency()
    );
    CodeTable::from_tree(&tree)
}

//==================================================================================
// 1. Whole-Buffer Encoding
//==================================================================================

/// Encodes `input_bytes` in one call.
///
/// Fails with `EmptyInput` when there is nothing to encode.
pub fn encode(input_bytes: &[u8]) -> Result<(Vec<u8>, HuffmanMetadata)> {
    let freqs = frequency::count(input_bytes);
    let table = build_code_table(&freqs)?;
    let total_bits = table.total_bits(&freqs);

    // Sized for the whole payload so the writer never needs draining here.
    let capacity = padded_len(total_bits) as usize;
    let mut writer = BitWriter::new(capacity, 0);
    write_symbols(&mut writer, &table, input_bytes);
    let (payload, padding_bits) = writer.finish();

    log::debug!(
        "huffman encode: {} bytes -> {} bytes ({} bits, {} padding)",
        input_bytes.len(),
        payload.len(),
        total_bits,
        padding_bits
    );

    let metadata = HuffmanMetadata {
        frequencies: frequency::non_zero(&freqs),
        padding_bits,
        compressed_len: payload.len() as u64,
    };
    Ok((payload, metadata))
}

/// Writes every symbol's code, four symbols per iteration.
#[inline]
fn write_symbols(writer: &mut BitWriter, table: &CodeTable, input_bytes: &[u8]) {
    let mut quads = input_bytes.chunks_exact(4);
    for quad in &mut quads {
        let c0 = table.raw(quad[0]);
        let c1 = table.raw(quad[1]);
        let c2 = table.raw(quad[2]);
        let c3 = table.raw(quad[3]);
        writer.write(c0.bits, c0.len as u32);
        writer.write(c1.bits, c1.len as u32);
        writer.write(c2.bits, c2.len as u32);
        writer.write(c3.bits, c3.len as u32);
    }
    for &symbol in quads.remainder() {
        let code = table.raw(symbol);
        writer.write(code.bits, code.len as u32);
    }
}

//==================================================================================
// 2. Streaming Encoding
//==================================================================================

/// Encodes a restartable chunk source without materialising its contents.
///
/// Returns the complete metadata (including `compressed_len`) and a lazy
/// iterator over the payload segments.
pub fn encode_stream<'a, S>(
    source: &'a S,
    config: &CodecConfig,
) -> Result<(HuffmanMetadata, EncodedSegments<'a>)>
where
    S: ChunkSource + ?Sized,
{
    config.validate()?;
    let freqs = frequency::count_chunks(source.open_pass()?)?;
    let table = build_code_table(&freqs)?;

    let total_bits = table.total_bits(&freqs);
    let compressed_len = padded_len(total_bits);
    let metadata = HuffmanMetadata {
        frequencies: frequency::non_zero(&freqs),
        padding_bits: padding_for(total_bits),
        compressed_len,
    };

    log::debug!(
        "huffman stream: {} symbols, {} distinct, {} payload bytes",
        freqs.iter().sum::<u64>(),
        metadata.frequencies.len(),
        compressed_len
    );

    let segments = EncodedSegments {
        pass: source.open_pass()?,
        table,
        writer: BitWriter::new(config.output_buffer_capacity, config.drain_safety_margin),
        current: Vec::new(),
        position: 0,
        expected_bits: total_bits,
        done: false,
    };
    Ok((metadata, segments))
}

/// Demand-driven producer of compressed payload segments.
///
/// Each call to `next` pulls just enough input to fill the writer's buffer up to
/// its drain threshold, then yields that buffer. The final segment is produced
/// by finishing the writer once the source is exhausted.
pub struct EncodedSegments<'a> {
    pass: ChunkPass<'a>,
    table: CodeTable,
    writer: BitWriter,
    current: Vec<u8>,
    position: usize,
    expected_bits: u64,
    done: bool,
}

impl EncodedSegments<'_> {
    /// Encodes from the current chunk until it runs out or the writer fills.
    /// Returns `true` if the writer needs draining.
    fn fill_from_current(&mut self) -> Result<bool> {
        while self.position < self.current.len() {
            let symbol = self.current[self.position];
            let code = self.table.raw(symbol);
            if code.len == 0 {
                return Err(HuffpackError::SourceMismatch(format!(
                    "symbol {} was not seen during the frequency pass",
                    symbol
                )));
            }
            self.writer.write(code.bits, code.len as u32);
            self.position += 1;
            if self.writer.should_drain() && self.writer.buffered_len() > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn finish(&mut self) -> Result<Option<Vec<u8>>> {
        let produced = self.writer.bits_written();
        if produced != self.expected_bits {
            return Err(HuffpackError::SourceMismatch(format!(
                "encode pass produced {} bits, frequency pass predicted {}",
                produced, self.expected_bits
            )));
        }
        let (tail, _padding) = self.writer.finish();
        Ok((!tail.is_empty()).then_some(tail))
    }

    fn advance(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            if self.fill_from_current()? {
                let segment = self.writer.drain();
                log::trace!("huffman stream: emitting {} byte segment", segment.len());
                return Ok(Some(segment));
            }
            match self.pass.next() {
                Some(chunk) => {
                    self.current = chunk?;
                    self.position = 0;
                }
                None => {
                    self.done = true;
                    return self.finish();
                }
            }
        }
    }
}

impl Iterator for EncodedSegments<'_> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(segment)) => Some(Ok(segment)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
#[path = "huffman_tests.rs"]
mod tests;
