// In: src/bridge/codec.rs

//! The stateful facade over the Huffman kernels and the container format.
//!
//! A `HuffmanCodec` holds a validated `CodecConfig` and nothing else; every call
//! owns its own frequency table, tree, code table and writer, so one codec can
//! be shared freely between independent encodes.

use std::io::{Read, Write};
use std::path::Path;

use crate::config::CodecConfig;
use crate::error::{HuffpackError, Result};
use crate::framing;
use crate::kernels::huffman::{self, EncodedSegments, HuffmanMetadata};
use crate::source::FileChunkSource;
use crate::traits::{ChunkSource, Codec, Encoded};

use super::format::{self, ContainerPayload};

#[derive(Debug, Clone, Default)]
pub struct HuffmanCodec {
    config: CodecConfig,
}

impl HuffmanCodec {
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Two-pass streaming encode. The metadata, including the final payload
    /// length, is known before the first segment is produced.
    pub fn encode_stream<'a, S>(&self, source: &'a S) -> Result<(HuffmanMetadata, EncodedSegments<'a>)>
    where
        S: ChunkSource + ?Sized,
    {
        huffman::encode_stream(source, &self.config)
    }

    /// Encodes `input` and wraps it in a container of the configured version.
    pub fn compress_to_container(&self, input: &[u8]) -> Result<Vec<u8>> {
        let (payload, metadata) = huffman::encode(input)?;
        let descriptor = format::descriptor(self.config.container_version)?;
        framing::serialize(&descriptor, &metadata, &payload)
    }

    /// Streams a container for `source` into `sink` without holding the
    /// payload in memory. Returns the number of bytes written.
    pub fn compress_stream_to_writer<S, W>(&self, source: &S, sink: &mut W) -> Result<u64>
    where
        S: ChunkSource + ?Sized,
        W: Write + ?Sized,
    {
        let (metadata, segments) = self.encode_stream(source)?;
        let payload_len = metadata.compressed_len;

        let descriptor = format::descriptor(self.config.container_version)?;
        let written =
            framing::serialize_streamed(&descriptor, &metadata, payload_len, segments, sink)?;

        log::info!(
            "huffman container written: {} distinct symbols, {} payload bytes, {} total",
            metadata.frequencies.len(),
            payload_len,
            written
        );
        Ok(written)
    }

    /// Compresses a file chunk by chunk, reading it twice.
    pub fn compress_file<W: Write + ?Sized>(&self, path: impl AsRef<Path>, sink: &mut W) -> Result<u64> {
        let source = FileChunkSource::new(path.as_ref(), self.config.source_chunk_size);
        self.compress_stream_to_writer(&source, sink)
    }

    /// Decodes a complete container.
    pub fn read_container(&self, bytes: &[u8]) -> Result<(HuffmanMetadata, Vec<u8>)> {
        format::read_container(bytes)
    }

    /// Decodes a container header and hands the payload back in segments of
    /// `read_segment_size` bytes.
    pub fn read_container_streamed<R: Read>(
        &self,
        reader: R,
    ) -> Result<(HuffmanMetadata, ContainerPayload<R>)> {
        format::read_container_streamed(reader, self.config.read_segment_size)
    }
}

impl Codec for HuffmanCodec {
    type Metadata = HuffmanMetadata;

    fn name(&self) -> &'static str {
        "huffman"
    }

    fn encode(&self, input: &[u8]) -> Result<Encoded<HuffmanMetadata>> {
        let (payload, metadata) = huffman::encode(input)?;
        Ok(Encoded { payload, metadata })
    }

    fn decode(&self, _metadata: &HuffmanMetadata, _payload: &[u8]) -> Result<Vec<u8>> {
        Err(HuffpackError::Unimplemented("huffman decoding"))
    }
}
