// In: src/framing/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Framing Layer
// ====================================================================================
//
// Framing is algorithm-agnostic. A metadata type registers its wire layout as a
// `FieldDescriptor` (an ordered list of named fields with accessors) and knows how
// to rebuild itself from a `DecodedRecord`. The writer and reader interpret that
// descriptor; neither knows anything about Huffman coding.
//
//   [Metadata + payload] --(writer::serialize / serialize_streamed)--> container bytes
//   container bytes --(reader::deserialize / deserialize_streamed)--> [Metadata + payload]
//
// ====================================================================================
pub mod reader;
pub mod schema;
pub mod writer;

pub use reader::{deserialize, deserialize_from, deserialize_streamed, PayloadSegments};
pub use schema::{
    DecodedRecord, FieldDescriptor, FieldKind, FieldSpec, FieldValue, IntWidth, PayloadMode,
    RestoreFromRecord,
};
pub use writer::{serialize, serialize_into, serialize_streamed};
