// In: src/bridge/format.rs

//! Defines the on-wire container for Huffman-coded payloads.
//!
//! The layout is registered with the framing layer as a `FieldDescriptor`, one
//! per container version. Readers peek the `magic` and `version` prefix and
//! pick the matching descriptor before decoding the rest.
//!
//! ```text
//! V1: [magic:4][version:2][padding_bits:1][count:1] {[symbol:1][freq:2]}* [len:4][payload]
//! V2: [magic:4][version:2][padding_bits:1][count:2] {[symbol:1][freq:4]}* [len:4][payload]
//! ```

use std::io::{Chain, Cursor, Read};

use crate::config::ContainerVersion;
use crate::error::{HuffpackError, Result};
use crate::framing::schema::{read_exact_or_truncated, Accessor};
use crate::framing::{
    self, DecodedRecord, FieldDescriptor, FieldSpec, FieldValue, IntWidth, PayloadSegments,
    RestoreFromRecord,
};
use crate::kernels::HuffmanMetadata;

//==================================================================================
// I. Format Constants
//==================================================================================

/// "HUFF", identifies a Huffman container.
pub const CONTAINER_MAGIC: u32 = 0x4855_4646;

/// Bytes of `magic` + `version`, the part every version shares.
pub const HEADER_PREFIX_LEN: usize = 6;

pub const MAGIC_FIELD: &str = "magic";
pub const VERSION_FIELD: &str = "version";
pub const PADDING_FIELD: &str = "padding_bits";
pub const FREQUENCIES_FIELD: &str = "frequencies";
pub const PAYLOAD_FIELD: &str = "compressed_data";

/// A streamed payload whose header prefix was consumed during version detection.
pub type ContainerPayload<R> = PayloadSegments<Chain<Cursor<[u8; HEADER_PREFIX_LEN]>, R>>;

//==================================================================================
// II. Descriptors
//==================================================================================

/// Builds the field layout for `version`.
pub fn descriptor(version: ContainerVersion) -> Result<FieldDescriptor<HuffmanMetadata>> {
    let (version_accessor, count_width, freq_width): (Accessor<HuffmanMetadata>, _, _) =
        match version {
            ContainerVersion::V1 => (v1_marker, IntWidth::U8, IntWidth::U16),
            ContainerVersion::V2 => (v2_marker, IntWidth::U16, IntWidth::U32),
        };

    FieldDescriptor::new(vec![
        FieldSpec::magic(MAGIC_FIELD, CONTAINER_MAGIC),
        FieldSpec::scalar(VERSION_FIELD, IntWidth::U16, version_accessor),
        FieldSpec::scalar(PADDING_FIELD, IntWidth::U8, |m: &HuffmanMetadata| {
            FieldValue::Unsigned(m.padding_bits as u64)
        }),
        FieldSpec::map(FREQUENCIES_FIELD, count_width, IntWidth::U8, freq_width, |m: &HuffmanMetadata| {
            FieldValue::Map(
                m.frequencies
                    .iter()
                    .map(|&(symbol, count)| (symbol as u64, count))
                    .collect(),
            )
        }),
        FieldSpec::compressed_data(PAYLOAD_FIELD, IntWidth::U32),
    ])
}

fn v1_marker(_: &HuffmanMetadata) -> FieldValue {
    FieldValue::Unsigned(ContainerVersion::V1.wire_value() as u64)
}

fn v2_marker(_: &HuffmanMetadata) -> FieldValue {
    FieldValue::Unsigned(ContainerVersion::V2.wire_value() as u64)
}

impl RestoreFromRecord for HuffmanMetadata {
    fn restore(record: &DecodedRecord) -> Result<Self> {
        let padding_bits: u8 = record.scalar(PADDING_FIELD)?;
        if padding_bits > 7 {
            return Err(HuffpackError::FieldTypeMismatch {
                field: PADDING_FIELD.to_string(),
                expected: "a padding count between 0 and 7",
            });
        }
        Ok(HuffmanMetadata {
            frequencies: record.map(FREQUENCIES_FIELD)?,
            padding_bits,
            compressed_len: record.payload_len(),
        })
    }
}

//==================================================================================
// III. Version Detection
//==================================================================================

/// Reads `magic` and `version` and resolves the container version.
pub fn peek_version<R: Read + ?Sized>(reader: &mut R) -> Result<ContainerVersion> {
    let magic = IntWidth::U32.read(MAGIC_FIELD, reader)?;
    if magic != CONTAINER_MAGIC as u64 {
        return Err(HuffpackError::InvalidMagic {
            expected: CONTAINER_MAGIC,
            actual: magic as u32,
        });
    }
    let version = IntWidth::U16.read(VERSION_FIELD, reader)? as u16;
    ContainerVersion::from_wire(version)
}

/// Decodes a complete in-memory container of any supported version.
pub fn read_container(bytes: &[u8]) -> Result<(HuffmanMetadata, Vec<u8>)> {
    let version = peek_version(&mut &bytes[..])?;
    framing::deserialize(&descriptor(version)?, bytes)
}

/// Decodes the header of a container and returns its payload as fixed-size segments.
pub fn read_container_streamed<R: Read>(
    mut reader: R,
    segment_size: usize,
) -> Result<(HuffmanMetadata, ContainerPayload<R>)> {
    let mut prefix = [0u8; HEADER_PREFIX_LEN];
    read_exact_or_truncated(&mut reader, &mut prefix, VERSION_FIELD)?;
    let version = peek_version(&mut &prefix[..])?;

    let replay = Cursor::new(prefix).chain(reader);
    framing::deserialize_streamed(&descriptor(version)?, replay, segment_size)
}
