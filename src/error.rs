// In: src/error.rs

//! This module defines the single, unified error type for the entire huffpack library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! No failure is retried inside the library. Every variant is surfaced to the
//! caller immediately, which decides whether to try again with different input.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuffpackError {
    // =========================================================================
    // === Construction Failures (nothing to build a code from)
    // =========================================================================
    #[error("Cannot build a Huffman tree: the input contains no symbols")]
    EmptyInput,

    #[error("Huffman code for symbol {symbol} needs {length} bits, maximum is 32")]
    CodeLengthOverflow { symbol: u8, length: usize },

    // =========================================================================
    // === Schema Violations (descriptor or decoded record is unusable)
    // =========================================================================
    #[error("Field descriptor has no compressed-data field")]
    MissingCompressedField,

    #[error("Field descriptor declares more than one compressed-data field")]
    DuplicateCompressedField,

    #[error("Decoded record is missing required field '{0}'")]
    MissingField(String),

    #[error("Field '{field}' has the wrong shape: expected {expected}")]
    FieldTypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("Value {value} of field '{field}' does not fit in {width} byte(s)")]
    FieldOverflow {
        field: String,
        value: u64,
        width: usize,
    },

    #[error("Invalid magic number: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic { expected: u32, actual: u32 },

    #[error("Unsupported container version: {0}")]
    UnsupportedVersion(u16),

    #[error("A streamed payload must be the final field of its descriptor")]
    StreamedPayloadNotLast,

    // =========================================================================
    // === Truncation
    // =========================================================================
    #[error("Source truncated while reading '{field}': needed {expected} byte(s), got {available}")]
    Truncated {
        field: String,
        expected: usize,
        available: usize,
    },

    // =========================================================================
    // === Streaming & API Contract
    // =========================================================================
    #[error("Operation is not available: {0}")]
    Unimplemented(&'static str),

    #[error("Chunk source changed between passes: {0}")]
    SourceMismatch(String),

    #[error("Invalid codec configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (e.g., file not found).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while loading a config file.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, HuffpackError>;
