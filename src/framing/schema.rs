//! Declarative description of a metadata record's on-wire layout.
//!
//! A `FieldDescriptor` is an ordered list of `FieldSpec`s; that order is the
//! wire order for both the writer and the reader. Each spec pairs a field name
//! and a wire shape with an accessor that extracts the value from a live
//! metadata instance. Decoding produces a `DecodedRecord`, from which the
//! metadata type rebuilds itself through `RestoreFromRecord`.

use std::io::{Read, Write};

use num_traits::NumCast;

use crate::error::{HuffpackError, Result};

//==================================================================================
// 1. Integer Widths
//==================================================================================

/// Width of a big-endian unsigned integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    U8,
    U16,
    U32,
    U64,
}

impl IntWidth {
    pub const fn bytes(self) -> usize {
        match self {
            IntWidth::U8 => 1,
            IntWidth::U16 => 2,
            IntWidth::U32 => 4,
            IntWidth::U64 => 8,
        }
    }

    pub const fn max_value(self) -> u64 {
        match self {
            IntWidth::U8 => u8::MAX as u64,
            IntWidth::U16 => u16::MAX as u64,
            IntWidth::U32 => u32::MAX as u64,
            IntWidth::U64 => u64::MAX,
        }
    }

    /// Writes `value` big-endian. Values wider than the field are rejected.
    pub fn write<W: Write + ?Sized>(self, field: &str, value: u64, sink: &mut W) -> Result<()> {
        if value > self.max_value() {
            return Err(HuffpackError::FieldOverflow {
                field: field.to_string(),
                value,
                width: self.bytes(),
            });
        }
        let bytes = value.to_be_bytes();
        sink.write_all(&bytes[8 - self.bytes()..])?;
        Ok(())
    }

    /// Reads a big-endian value and zero-extends it to `u64`.
    pub fn read<R: Read + ?Sized>(self, field: &str, source: &mut R) -> Result<u64> {
        let mut bytes = [0u8; 8];
        read_exact_or_truncated(source, &mut bytes[8 - self.bytes()..], field)?;
        Ok(u64::from_be_bytes(bytes))
    }
}

/// `read_exact` that reports how much was available when the source ends early.
pub(crate) fn read_exact_or_truncated<R: Read + ?Sized>(
    source: &mut R,
    buf: &mut [u8],
    field: &str,
) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(HuffpackError::Truncated {
                    field: field.to_string(),
                    expected: buf.len(),
                    available: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

//==================================================================================
// 2. Field Shapes and Values
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A fixed 4-byte identifier, checked on read.
    Magic(u32),
    /// A single unsigned integer.
    Scalar(IntWidth),
    /// A raw byte array of fixed length.
    Bytes(usize),
    /// Count prefix followed by that many elements.
    Array { count: IntWidth, element: IntWidth },
    /// Count prefix followed by that many key/value pairs.
    Map {
        count: IntWidth,
        key: IntWidth,
        value: IntWidth,
    },
    /// Length prefix followed by the codec payload.
    CompressedData { length: IntWidth },
}

/// A decoded (or about-to-be-encoded) field value, always zero-extended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Unsigned(u64),
    Bytes(Vec<u8>),
    Array(Vec<u64>),
    /// Entries in wire order.
    Map(Vec<(u64, u64)>),
}

pub type Accessor<M> = fn(&M) -> FieldValue;

pub struct FieldSpec<M> {
    pub name: &'static str,
    pub kind: FieldKind,
    accessor: Option<Accessor<M>>,
}

impl<M> FieldSpec<M> {
    pub fn magic(name: &'static str, value: u32) -> Self {
        Self { name, kind: FieldKind::Magic(value), accessor: None }
    }

    pub fn scalar(name: &'static str, width: IntWidth, accessor: Accessor<M>) -> Self {
        Self { name, kind: FieldKind::Scalar(width), accessor: Some(accessor) }
    }

    pub fn bytes(name: &'static str, len: usize, accessor: Accessor<M>) -> Self {
        Self { name, kind: FieldKind::Bytes(len), accessor: Some(accessor) }
    }

    pub fn array(
        name: &'static str,
        count: IntWidth,
        element: IntWidth,
        accessor: Accessor<M>,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Array { count, element },
            accessor: Some(accessor),
        }
    }

    pub fn map(
        name: &'static str,
        count: IntWidth,
        key: IntWidth,
        value: IntWidth,
        accessor: Accessor<M>,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Map { count, key, value },
            accessor: Some(accessor),
        }
    }

    pub fn compressed_data(name: &'static str, length: IntWidth) -> Self {
        Self { name, kind: FieldKind::CompressedData { length }, accessor: None }
    }

    /// Value of this field for `metadata`. Magic fields yield their constant.
    pub(crate) fn value_of(&self, metadata: &M) -> Result<FieldValue> {
        match (self.kind, self.accessor) {
            (FieldKind::Magic(value), _) => Ok(FieldValue::Unsigned(value as u64)),
            (_, Some(accessor)) => Ok(accessor(metadata)),
            (_, None) => Err(HuffpackError::FieldTypeMismatch {
                field: self.name.to_string(),
                expected: "a field with an accessor",
            }),
        }
    }
}

//==================================================================================
// 3. Field Descriptor
//==================================================================================

pub struct FieldDescriptor<M> {
    fields: Vec<FieldSpec<M>>,
    compressed_index: usize,
}

impl<M> FieldDescriptor<M> {
    /// Validates that exactly one compressed-data field is present.
    pub fn new(fields: Vec<FieldSpec<M>>) -> Result<Self> {
        let mut compressed = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| matches!(f.kind, FieldKind::CompressedData { .. }))
            .map(|(i, _)| i);

        let compressed_index = compressed.next().ok_or(HuffpackError::MissingCompressedField)?;
        if compressed.next().is_some() {
            return Err(HuffpackError::DuplicateCompressedField);
        }
        Ok(Self { fields, compressed_index })
    }

    pub fn fields(&self) -> &[FieldSpec<M>] {
        &self.fields
    }

    pub fn compressed_field(&self) -> &FieldSpec<M> {
        &self.fields[self.compressed_index]
    }

    pub fn compressed_index(&self) -> usize {
        self.compressed_index
    }

    /// Streaming reads require the payload to be the final field.
    pub fn payload_is_last(&self) -> bool {
        self.compressed_index + 1 == self.fields.len()
    }
}

//==================================================================================
// 4. Decoded Records
//==================================================================================

/// How the payload was delivered to the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    Buffered,
    Streamed,
}

/// All decoded fields of one container, keyed by field name in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    values: Vec<(&'static str, FieldValue)>,
    payload_len: u64,
    mode: PayloadMode,
}

impl DecodedRecord {
    pub(crate) fn new(mode: PayloadMode) -> Self {
        Self { values: Vec::new(), payload_len: 0, mode }
    }

    pub(crate) fn push(&mut self, name: &'static str, value: FieldValue) {
        self.values.push((name, value));
    }

    pub(crate) fn set_payload_len(&mut self, len: u64) {
        self.payload_len = len;
    }

    pub fn get(&self, name: &str) -> Result<&FieldValue> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| HuffpackError::MissingField(name.to_string()))
    }

    pub fn payload_len(&self) -> u64 {
        self.payload_len
    }

    pub fn mode(&self) -> PayloadMode {
        self.mode
    }

    /// Reads a scalar and converts it to the caller's numeric type.
    pub fn scalar<T: NumCast>(&self, name: &str) -> Result<T> {
        match self.get(name)? {
            FieldValue::Unsigned(v) => cast(name, *v),
            _ => Err(mismatch(name, "a scalar")),
        }
    }

    pub fn bytes(&self, name: &str) -> Result<&[u8]> {
        match self.get(name)? {
            FieldValue::Bytes(b) => Ok(b),
            _ => Err(mismatch(name, "a byte array")),
        }
    }

    pub fn array<T: NumCast>(&self, name: &str) -> Result<Vec<T>> {
        match self.get(name)? {
            FieldValue::Array(items) => items.iter().map(|&v| cast(name, v)).collect(),
            _ => Err(mismatch(name, "an array")),
        }
    }

    /// Map entries in wire order, converted to the caller's key/value types.
    pub fn map<K: NumCast, V: NumCast>(&self, name: &str) -> Result<Vec<(K, V)>> {
        match self.get(name)? {
            FieldValue::Map(entries) => entries
                .iter()
                .map(|&(k, v)| Ok((cast(name, k)?, cast(name, v)?)))
                .collect(),
            _ => Err(mismatch(name, "a map")),
        }
    }
}

fn cast<T: NumCast>(name: &str, value: u64) -> Result<T> {
    <T as NumCast>::from(value).ok_or_else(|| HuffpackError::FieldOverflow {
        field: name.to_string(),
        value,
        width: std::mem::size_of::<T>(),
    })
}

fn mismatch(name: &str, expected: &'static str) -> HuffpackError {
    HuffpackError::FieldTypeMismatch { field: name.to_string(), expected }
}

/// Rebuilds a concrete metadata type from its decoded fields.
pub trait RestoreFromRecord: Sized {
    fn restore(record: &DecodedRecord) -> Result<Self>;
}
