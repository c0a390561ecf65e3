// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public-facing API of the huffpack library. It joins the pure
// Huffman kernels to the algorithm-agnostic framing layer and owns the container
// format. Nothing below it knows what a container is.
//
// Data Flow (Buffered):
//
//   1. [HuffmanCodec::compress_to_container]  -> Receives `&[u8]`
//         |
//         `-> a. kernels::huffman::encode -> (payload, HuffmanMetadata)
//         |
//         `-> b. framing::serialize with format::descriptor(version)
//
// Data Flow (Streamed):
//
//   1. [HuffmanCodec::compress_stream_to_writer] -> Receives `&dyn ChunkSource`
//         |
//         `-> a. kernels::huffman::encode_stream: pass 1 counts, metadata is final
//         |
//         `-> b. framing::serialize_streamed forwards each EncodedSegments item
//                (pass 2) straight into the sink
//
// Reading:
//
//   format::read_container(_streamed) peeks magic + version, picks the matching
//   descriptor and restores `HuffmanMetadata` from the decoded record.
//
// ====================================================================================
pub mod codec;
pub mod format;

pub use codec::HuffmanCodec;
pub use format::{descriptor, read_container, read_container_streamed, ContainerPayload, CONTAINER_MAGIC};

#[cfg(test)]
mod tests;
