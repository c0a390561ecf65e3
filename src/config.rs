// In: src/config.rs

//! The single source of truth for all huffpack codec configuration.
//!
//! `CodecConfig` is created once at the application boundary (e.g., from a
//! JSON file) and handed to `HuffmanCodec`. Every field has a serde default, so
//! an empty JSON object is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HuffpackError, Result};

//==================================================================================
// I. Container Versions
//==================================================================================

/// Selects the on-wire layout of the Huffman frequency table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContainerVersion {
    /// The original layout: a 1-byte entry count and 2-byte occurrence counts.
    /// Inputs with 256 distinct symbols or any count above 65535 are rejected.
    V1,

    /// **Default:** a 2-byte entry count and 4-byte occurrence counts.
    #[default]
    V2,
}

impl ContainerVersion {
    /// The value written into the container's `version` field.
    pub fn wire_value(self) -> u16 {
        match self {
            ContainerVersion::V1 => 1,
            ContainerVersion::V2 => 2,
        }
    }

    pub fn from_wire(value: u16) -> Result<Self> {
        match value {
            1 => Ok(ContainerVersion::V1),
            2 => Ok(ContainerVersion::V2),
            other => Err(HuffpackError::UnsupportedVersion(other)),
        }
    }
}

//==================================================================================
// II. The Unified CodecConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// Capacity of the bit writer's output buffer, in bytes.
    #[serde(default = "default_output_buffer_capacity")]
    pub output_buffer_capacity: usize,

    /// The writer asks to be drained once fewer than this many bytes of
    /// capacity remain. Must leave room for one full register flush (8 bytes).
    #[serde(default = "default_drain_safety_margin")]
    pub drain_safety_margin: usize,

    /// Segment size used when a streamed payload is read back.
    #[serde(default = "default_segment_size")]
    pub read_segment_size: usize,

    /// Chunk size produced by `FileChunkSource`.
    #[serde(default = "default_segment_size")]
    pub source_chunk_size: usize,

    /// Layout written by the container serializer.
    #[serde(default)]
    pub container_version: ContainerVersion,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            output_buffer_capacity: default_output_buffer_capacity(),
            drain_safety_margin: default_drain_safety_margin(),
            read_segment_size: default_segment_size(),
            source_chunk_size: default_segment_size(),
            container_version: ContainerVersion::default(),
        }
    }
}

impl CodecConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CodecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Rejects settings the bit writer or the readers cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.read_segment_size == 0 || self.source_chunk_size == 0 {
            return Err(HuffpackError::InvalidConfig(
                "segment and chunk sizes must be non-zero".to_string(),
            ));
        }
        if self.drain_safety_margin < MIN_DRAIN_SAFETY_MARGIN {
            return Err(HuffpackError::InvalidConfig(format!(
                "drain_safety_margin must be at least {} bytes, got {}",
                MIN_DRAIN_SAFETY_MARGIN, self.drain_safety_margin
            )));
        }
        if self.drain_safety_margin >= self.output_buffer_capacity {
            return Err(HuffpackError::InvalidConfig(format!(
                "drain_safety_margin ({}) must be smaller than output_buffer_capacity ({})",
                self.drain_safety_margin, self.output_buffer_capacity
            )));
        }
        Ok(())
    }
}

/// One register flush can emit at most this many bytes.
pub const MIN_DRAIN_SAFETY_MARGIN: usize = 8;

fn default_output_buffer_capacity() -> usize {
    64 * 1024
}

fn default_drain_safety_margin() -> usize {
    64
}

fn default_segment_size() -> usize {
    64 * 1024
}
