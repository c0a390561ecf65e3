//! Serializes a metadata instance plus its payload according to a
//! `FieldDescriptor`, either from a complete buffer or from a stream of
//! payload segments that is forwarded without being collected.

use std::io::Write;

use crate::error::{HuffpackError, Result};
use crate::framing::schema::{FieldDescriptor, FieldKind, FieldSpec, FieldValue, IntWidth};

/// Serializes into a fresh buffer.
pub fn serialize<M>(descriptor: &FieldDescriptor<M>, metadata: &M, payload: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(payload.len() + 64);
    serialize_into(descriptor, metadata, payload, &mut out)?;
    Ok(out)
}

/// Serializes into any writer.
pub fn serialize_into<M, W: Write + ?Sized>(
    descriptor: &FieldDescriptor<M>,
    metadata: &M,
    payload: &[u8],
    sink: &mut W,
) -> Result<()> {
    for spec in descriptor.fields() {
        match spec.kind {
            FieldKind::CompressedData { length } => {
                length.write(spec.name, payload.len() as u64, sink)?;
                sink.write_all(payload)?;
            }
            _ => write_field(spec, metadata, sink)?,
        }
    }
    Ok(())
}

/// Serializes with a payload supplied as a sequence of segments.
///
/// `payload_len` is written as the length prefix up front; every segment is
/// then forwarded unchanged. A stream whose total differs from `payload_len`
/// is an error. Returns the number of container bytes written.
pub fn serialize_streamed<M, W, I>(
    descriptor: &FieldDescriptor<M>,
    metadata: &M,
    payload_len: u64,
    segments: I,
    sink: &mut W,
) -> Result<u64>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = Result<Vec<u8>>>,
{
    let mut counting = CountingWriter { inner: sink, written: 0 };
    let mut segments = Some(segments);

    for spec in descriptor.fields() {
        match spec.kind {
            FieldKind::CompressedData { length } => {
                length.write(spec.name, payload_len, &mut counting)?;
                let mut forwarded = 0u64;
                for segment in segments.take().into_iter().flatten() {
                    let segment = segment?;
                    forwarded += segment.len() as u64;
                    if forwarded > payload_len {
                        break;
                    }
                    counting.write_all(&segment)?;
                }
                if forwarded != payload_len {
                    return Err(HuffpackError::SourceMismatch(format!(
                        "payload stream for '{}' declared {} bytes but produced {}",
                        spec.name, payload_len, forwarded
                    )));
                }
            }
            _ => write_field(spec, metadata, &mut counting)?,
        }
    }

    counting.flush()?;
    log::debug!(
        "serialized streamed container: {} bytes ({} payload)",
        counting.written,
        payload_len
    );
    Ok(counting.written)
}

/// Writes one non-payload field at its declared widths.
fn write_field<M, W: Write + ?Sized>(spec: &FieldSpec<M>, metadata: &M, sink: &mut W) -> Result<()> {
    let value = spec.value_of(metadata)?;
    match (spec.kind, value) {
        (FieldKind::Magic(_), FieldValue::Unsigned(v)) => IntWidth::U32.write(spec.name, v, sink),
        (FieldKind::Scalar(width), FieldValue::Unsigned(v)) => width.write(spec.name, v, sink),
        (FieldKind::Bytes(len), FieldValue::Bytes(bytes)) => {
            if bytes.len() != len {
                return Err(HuffpackError::FieldTypeMismatch {
                    field: spec.name.to_string(),
                    expected: "a byte array of the declared length",
                });
            }
            sink.write_all(&bytes)?;
            Ok(())
        }
        (FieldKind::Array { count, element }, FieldValue::Array(items)) => {
            count.write(spec.name, items.len() as u64, sink)?;
            for item in items {
                element.write(spec.name, item, sink)?;
            }
            Ok(())
        }
        (FieldKind::Map { count, key, value }, FieldValue::Map(entries)) => {
            count.write(spec.name, entries.len() as u64, sink)?;
            for (k, v) in entries {
                key.write(spec.name, k, sink)?;
                value.write(spec.name, v, sink)?;
            }
            Ok(())
        }
        (kind, _) => Err(HuffpackError::FieldTypeMismatch {
            field: spec.name.to_string(),
            expected: shape_name(kind),
        }),
    }
}

fn shape_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Magic(_) | FieldKind::Scalar(_) => "a scalar",
        FieldKind::Bytes(_) => "a byte array",
        FieldKind::Array { .. } => "an array",
        FieldKind::Map { .. } => "a map",
        FieldKind::CompressedData { .. } => "the payload",
    }
}

struct CountingWriter<'a, W: Write + ?Sized> {
    inner: &'a mut W,
    written: u64,
}

impl<W: Write + ?Sized> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
