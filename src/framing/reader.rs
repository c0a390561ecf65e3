//! Reads a container back according to a `FieldDescriptor`.
//!
//! Fields are read in descriptor order into a `DecodedRecord`, which the
//! metadata type turns back into a concrete instance. The payload is either
//! collected into a buffer or handed out as fixed-size segments read on demand.

use std::io::{Cursor, Read};

use crate::error::{HuffpackError, Result};
use crate::framing::schema::{
    read_exact_or_truncated, DecodedRecord, FieldDescriptor, FieldKind, FieldSpec, FieldValue,
    IntWidth, PayloadMode, RestoreFromRecord,
};

/// Upper bound on speculative pre-allocation for count-prefixed fields.
const MAX_PREALLOCATED_ENTRIES: usize = 4096;

/// Decodes a complete container held in memory.
pub fn deserialize<M: RestoreFromRecord>(
    descriptor: &FieldDescriptor<M>,
    bytes: &[u8],
) -> Result<(M, Vec<u8>)> {
    let mut cursor = Cursor::new(bytes);
    deserialize_from(descriptor, &mut cursor)
}

/// Decodes a container from a reader, collecting the payload into memory.
pub fn deserialize_from<M: RestoreFromRecord, R: Read + ?Sized>(
    descriptor: &FieldDescriptor<M>,
    reader: &mut R,
) -> Result<(M, Vec<u8>)> {
    let mut record = DecodedRecord::new(PayloadMode::Buffered);
    let mut payload = Vec::new();

    for spec in descriptor.fields() {
        match spec.kind {
            FieldKind::CompressedData { length } => {
                let len = length.read(spec.name, reader)?;
                (&mut *reader).take(len).read_to_end(&mut payload)?;
                if (payload.len() as u64) < len {
                    return Err(truncated(spec.name, len, payload.len() as u64));
                }
                record.set_payload_len(len);
            }
            _ => record.push(spec.name, read_field(spec, reader)?),
        }
    }

    let metadata = M::restore(&record)?;
    Ok((metadata, payload))
}

/// Decodes the header fields and returns the payload as a lazy segment stream.
///
/// The payload field must be the last one in the descriptor. Segments are
/// exactly `segment_size` bytes (the last may be shorter), independent of how
/// the payload was chunked when it was written.
pub fn deserialize_streamed<M: RestoreFromRecord, R: Read>(
    descriptor: &FieldDescriptor<M>,
    mut reader: R,
    segment_size: usize,
) -> Result<(M, PayloadSegments<R>)> {
    if !descriptor.payload_is_last() {
        return Err(HuffpackError::StreamedPayloadNotLast);
    }

    let mut record = DecodedRecord::new(PayloadMode::Streamed);
    let payload_spec = descriptor.compressed_field();
    for spec in &descriptor.fields()[..descriptor.compressed_index()] {
        record.push(spec.name, read_field(spec, &mut reader)?);
    }

    let FieldKind::CompressedData { length } = payload_spec.kind else {
        return Err(HuffpackError::MissingCompressedField);
    };
    let len = length.read(payload_spec.name, &mut reader)?;
    record.set_payload_len(len);

    let metadata = M::restore(&record)?;
    let segments = PayloadSegments {
        reader,
        field: payload_spec.name,
        total: len,
        remaining: len,
        segment_size: segment_size.max(1),
        failed: false,
    };
    Ok((metadata, segments))
}

/// Reads one non-payload field at its declared widths.
fn read_field<M, R: Read + ?Sized>(spec: &FieldSpec<M>, reader: &mut R) -> Result<FieldValue> {
    match spec.kind {
        FieldKind::Magic(expected) => {
            let actual = IntWidth::U32.read(spec.name, reader)?;
            if actual != expected as u64 {
                return Err(HuffpackError::InvalidMagic {
                    expected,
                    actual: actual as u32,
                });
            }
            Ok(FieldValue::Unsigned(actual))
        }
        FieldKind::Scalar(width) => Ok(FieldValue::Unsigned(width.read(spec.name, reader)?)),
        FieldKind::Bytes(len) => {
            let mut bytes = vec![0u8; len];
            read_exact_or_truncated(reader, &mut bytes, spec.name)?;
            Ok(FieldValue::Bytes(bytes))
        }
        FieldKind::Array { count, element } => {
            let n = count.read(spec.name, reader)? as usize;
            let mut items = Vec::with_capacity(n.min(MAX_PREALLOCATED_ENTRIES));
            for _ in 0..n {
                items.push(element.read(spec.name, reader)?);
            }
            Ok(FieldValue::Array(items))
        }
        FieldKind::Map { count, key, value } => {
            let n = count.read(spec.name, reader)? as usize;
            let mut entries = Vec::with_capacity(n.min(MAX_PREALLOCATED_ENTRIES));
            for _ in 0..n {
                let k = key.read(spec.name, reader)?;
                let v = value.read(spec.name, reader)?;
                entries.push((k, v));
            }
            Ok(FieldValue::Map(entries))
        }
        FieldKind::CompressedData { .. } => Err(HuffpackError::FieldTypeMismatch {
            field: spec.name.to_string(),
            expected: "a non-payload field",
        }),
    }
}

fn truncated(field: &str, expected: u64, available: u64) -> HuffpackError {
    HuffpackError::Truncated {
        field: field.to_string(),
        expected: expected as usize,
        available: available as usize,
    }
}

/// Payload bytes of a streamed container, re-chunked into fixed-size segments.
pub struct PayloadSegments<R> {
    reader: R,
    field: &'static str,
    total: u64,
    remaining: u64,
    segment_size: usize,
    failed: bool,
}

impl<R: Read> PayloadSegments<R> {
    /// Declared payload length.
    pub fn total_len(&self) -> u64 {
        self.total
    }

    /// Gives back the underlying reader, positioned after whatever was consumed.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for PayloadSegments<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        let want = self.remaining.min(self.segment_size as u64) as usize;
        let mut segment = vec![0u8; want];
        if let Err(e) = read_exact_or_truncated(&mut self.reader, &mut segment, self.field) {
            self.failed = true;
            // Report truncation against the whole payload, not just this segment.
            return Some(Err(match e {
                HuffpackError::Truncated { available, .. } => truncated(
                    self.field,
                    self.total,
                    self.total - self.remaining + available as u64,
                ),
                other => other,
            }));
        }
        self.remaining -= want as u64;
        Some(Ok(segment))
    }
}
