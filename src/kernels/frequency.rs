//! This module contains the pure, stateless kernels for counting symbol
//! occurrences over a byte buffer or a stream of byte chunks.
//!
//! Chunk counts are combined with an element-wise sum, which is associative and
//! commutative: chunk boundaries and processing order never change the result.

use crate::error::Result;

/// Occurrence count per byte value, indexed by the byte itself.
pub type FrequencyTable = [u64; 256];

/// Counts every byte of `input_bytes`.
pub fn count(input_bytes: &[u8]) -> FrequencyTable {
    let mut freqs = [0u64; 256];
    accumulate(&mut freqs, input_bytes);
    freqs
}

/// Adds the byte counts of `input_bytes` to an existing table.
pub fn accumulate(freqs: &mut FrequencyTable, input_bytes: &[u8]) {
    let mut quads = input_bytes.chunks_exact(4);
    for quad in &mut quads {
        freqs[quad[0] as usize] += 1;
        freqs[quad[1] as usize] += 1;
        freqs[quad[2] as usize] += 1;
        freqs[quad[3] as usize] += 1;
    }
    for &byte in quads.remainder() {
        freqs[byte as usize] += 1;
    }
}

/// Element-wise sum of two partial tables.
pub fn merge(mut left: FrequencyTable, right: &FrequencyTable) -> FrequencyTable {
    for (total, partial) in left.iter_mut().zip(right.iter()) {
        *total += *partial;
    }
    left
}

/// Counts the bytes of every chunk in a fallible chunk stream.
pub fn count_chunks<I>(chunks: I) -> Result<FrequencyTable>
where
    I: IntoIterator<Item = Result<Vec<u8>>>,
{
    let mut freqs = [0u64; 256];
    for chunk in chunks {
        let partial = count(&chunk?);
        freqs = merge(freqs, &partial);
    }
    Ok(freqs)
}

/// The non-zero entries of a table, in ascending symbol order.
pub fn non_zero(freqs: &FrequencyTable) -> Vec<(u8, u64)> {
    freqs
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(symbol, &count)| (symbol as u8, count))
        .collect()
}

/// Expands a sparse `(symbol, count)` list back into a full table.
pub fn from_entries(entries: &[(u8, u64)]) -> FrequencyTable {
    let mut freqs = [0u64; 256];
    for &(symbol, count) in entries {
        freqs[symbol as usize] += count;
    }
    freqs
}
