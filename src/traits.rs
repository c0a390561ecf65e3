//! This module defines the shared contracts between the codec engine and the
//! outside world: the pluggable `Codec` interface and the restartable
//! `ChunkSource` consumed by streaming encoders.

use crate::error::Result;

/// One pass over a chunk source. Chunks are pulled on demand.
pub type ChunkPass<'a> = Box<dyn Iterator<Item = Result<Vec<u8>>> + 'a>;

/// A byte source that can be read from the start any number of times.
///
/// Every call to `open_pass` must yield the same sequence of bytes; streaming
/// encoders read the source twice (frequency pass, then encode pass) and treat
/// any difference between the two as an error.
pub trait ChunkSource {
    fn open_pass(&self) -> Result<ChunkPass<'_>>;
}

/// The output of a whole-buffer encode: compressed bytes plus the metadata a
/// decoder would need to interpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded<M> {
    pub payload: Vec<u8>,
    pub metadata: M,
}

/// The encode/decode contract every algorithm implements.
pub trait Codec {
    type Metadata;

    /// Short, stable identifier of the algorithm (e.g. "huffman").
    fn name(&self) -> &'static str;

    fn encode(&self, input: &[u8]) -> Result<Encoded<Self::Metadata>>;

    /// Restores the original bytes. Implementations that cannot decode must
    /// return `HuffpackError::Unimplemented` rather than best-effort output.
    fn decode(&self, metadata: &Self::Metadata, payload: &[u8]) -> Result<Vec<u8>>;
}
