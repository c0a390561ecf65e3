//! Builds an optimal binary prefix tree from a symbol frequency table.
//!
//! Nodes live in a flat arena and refer to their children by index, so the
//! tree has a single owner and no back-references.
//!
//! Construction uses the two-queue method instead of a heap. Leaves are sorted
//! once by frequency. Every merged node is at least as heavy as the one merged
//! before it, so appending merged nodes to a second queue keeps that queue
//! sorted too, and the two smallest remaining nodes are always found at the
//! queue fronts. Ties go to the leaf queue, which fixes the code shapes for
//! equal frequencies.

use crate::error::{HuffpackError, Result};
use crate::kernels::frequency::FrequencyTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf { symbol: u8, freq: u64 },
    Internal { freq: u64, left: usize, right: usize },
}

impl HuffmanNode {
    pub fn freq(&self) -> u64 {
        match *self {
            HuffmanNode::Leaf { freq, .. } | HuffmanNode::Internal { freq, .. } => freq,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: usize,
}

impl HuffmanTree {
    /// Builds the tree, or fails with `EmptyInput` if no symbol has a non-zero count.
    pub fn build(freqs: &FrequencyTable) -> Result<Self> {
        let mut leaves: Vec<HuffmanNode> = freqs
            .iter()
            .enumerate()
            .filter(|&(_, &freq)| freq > 0)
            .map(|(symbol, &freq)| HuffmanNode::Leaf {
                symbol: symbol as u8,
                freq,
            })
            .collect();

        if leaves.is_empty() {
            return Err(HuffpackError::EmptyInput);
        }

        // Stable sort: equal frequencies stay in ascending symbol order.
        leaves.sort_by_key(HuffmanNode::freq);

        let leaf_count = leaves.len();
        let mut nodes = leaves;
        nodes.reserve(leaf_count.saturating_sub(1));

        // A lone leaf is its own root.
        if leaf_count == 1 {
            return Ok(Self { nodes, root: 0 });
        }

        // Leaf queue is nodes[next_leaf..leaf_count]; the internal queue is
        // nodes[next_internal..], which grows as merged nodes are appended.
        let mut next_leaf = 0usize;
        let mut next_internal = leaf_count;

        while (leaf_count - next_leaf) + (nodes.len() - next_internal) > 1 {
            let left = Self::take_smallest(&nodes, leaf_count, &mut next_leaf, &mut next_internal);
            let right = Self::take_smallest(&nodes, leaf_count, &mut next_leaf, &mut next_internal);
            let freq = nodes[left].freq() + nodes[right].freq();
            nodes.push(HuffmanNode::Internal { freq, left, right });
        }

        let root = nodes.len() - 1;
        Ok(Self { nodes, root })
    }

    /// Pops the lighter of the two queue fronts, preferring the leaf on ties.
    #[inline]
    fn take_smallest(
        nodes: &[HuffmanNode],
        leaf_count: usize,
        next_leaf: &mut usize,
        next_internal: &mut usize,
    ) -> usize {
        let leaf_available = *next_leaf < leaf_count;
        let internal_available = *next_internal < nodes.len();

        let take_leaf = match (leaf_available, internal_available) {
            (true, true) => nodes[*next_leaf].freq() <= nodes[*next_internal].freq(),
            (true, false) => true,
            _ => false,
        };

        if take_leaf {
            *next_leaf += 1;
            *next_leaf - 1
        } else {
            *next_internal += 1;
            *next_internal - 1
        }
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn node(&self, index: usize) -> &HuffmanNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[HuffmanNode] {
        &self.nodes
    }

    /// Total frequency held by the root, i.e. the number of input symbols.
    pub fn frequency(&self) -> u64 {
        self.nodes[self.root].freq()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, HuffmanNode::Leaf { .. }))
            .count()
    }
}
