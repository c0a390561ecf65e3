//! Derives the symbol -> code lookup table from a `HuffmanTree`.
//!
//! Codes are root-to-leaf paths (left = 0, right = 1), so the table is
//! prefix-free by construction.

use crate::error::{HuffpackError, Result};
use crate::kernels::bit_writer::MAX_WRITE_BITS;
use crate::kernels::frequency::FrequencyTable;
use crate::kernels::huffman_tree::{HuffmanNode, HuffmanTree};

/// A right-aligned bit pattern and its length in bits (1-32).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HuffmanCode {
    pub bits: u32,
    pub len: u8,
}

impl HuffmanCode {
    /// True if `self` is a bit-prefix of `other` (or equal to it). The empty
    /// code is a prefix of every code.
    pub fn is_prefix_of(&self, other: &HuffmanCode) -> bool {
        if self.len > other.len {
            return false;
        }
        let shift = u32::from(other.len - self.len);
        other.bits.checked_shr(shift).unwrap_or(0) == self.bits
    }
}

#[derive(Debug, Clone)]
pub struct CodeTable {
    /// Indexed by symbol; `len == 0` marks a symbol that has no code.
    codes: [HuffmanCode; 256],
}

impl CodeTable {
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut codes = [HuffmanCode::default(); 256];

        if let HuffmanNode::Leaf { symbol, .. } = *tree.node(tree.root()) {
            // A lone symbol still costs one bit per occurrence.
            codes[symbol as usize] = HuffmanCode { bits: 0, len: 1 };
            return Ok(Self { codes });
        }

        // (node, accumulated bits, depth)
        let mut stack: Vec<(usize, u64, usize)> = vec![(tree.root(), 0, 0)];
        while let Some((index, bits, depth)) = stack.pop() {
            match *tree.node(index) {
                HuffmanNode::Leaf { symbol, .. } => {
                    if depth > MAX_WRITE_BITS as usize {
                        return Err(HuffpackError::CodeLengthOverflow {
                            symbol,
                            length: depth,
                        });
                    }
                    codes[symbol as usize] = HuffmanCode {
                        bits: bits as u32,
                        len: depth as u8,
                    };
                }
                HuffmanNode::Internal { left, right, .. } => {
                    // Deeper paths only grow; stop shifting once past the limit.
                    let next = if depth < MAX_WRITE_BITS as usize { bits << 1 } else { bits };
                    stack.push((right, next | 1, depth + 1));
                    stack.push((left, next, depth + 1));
                }
            }
        }

        Ok(Self { codes })
    }

    /// Code for `symbol`, or `None` if the symbol never occurred.
    #[inline(always)]
    pub fn code(&self, symbol: u8) -> Option<HuffmanCode> {
        let code = self.codes[symbol as usize];
        (code.len > 0).then_some(code)
    }

    /// Unchecked lookup for the hot loop; symbols without a code yield `len == 0`.
    #[inline(always)]
    pub(crate) fn raw(&self, symbol: u8) -> HuffmanCode {
        self.codes[symbol as usize]
    }

    /// All assigned codes in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, HuffmanCode)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| code.len > 0)
            .map(|(symbol, code)| (symbol as u8, *code))
    }

    /// Exact encoded size in bits: the sum of `freq * code length`.
    pub fn total_bits(&self, freqs: &FrequencyTable) -> u64 {
        self.codes
            .iter()
            .zip(freqs.iter())
            .map(|(code, &freq)| freq * code.len as u64)
            .sum()
    }
}
