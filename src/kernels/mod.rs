//! The pure, stateless building blocks of the Huffman codec.
//!
//! Each sub-module does one job; `huffman` composes them into the whole-buffer
//! and streaming encoders. Nothing in here knows about container framing.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Symbol statistics
pub mod frequency;

/// Tree and code construction
pub mod huffman_tree;
pub mod code_table;

/// Bit-level output
pub mod bit_writer;

/// Encoders
pub mod huffman;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use self::code_table::{CodeTable, HuffmanCode};
pub use self::frequency::FrequencyTable;
pub use self::huffman::{encode, encode_stream, EncodedSegments, HuffmanMetadata};
pub use self::huffman_tree::{HuffmanNode, HuffmanTree};
