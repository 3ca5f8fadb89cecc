//! Message codec.
//!
//! A [`MessageCodec`] owns a shared [`MessageSchema`] and drives the generic encoder/decoder
//! from its wire-order table. Encode and decode are pure with respect to their inputs: output
//! is a function of (schema, input, version) only, no state is shared between calls, and each
//! call allocates at most one output buffer.

use std::sync::Arc;

use crate::error::{DecodeError, Result, ValueError};
use crate::protocol::{
    wire, CrcExtra, Field, FieldValue, MavLinkVersion, MessageDef, MessageId, MessageSchema,
    MessageValue, WireType,
};

/// Payload codec for one message type.
///
/// # Examples
///
/// ```rust
/// use mavdialect::prelude::*;
///
/// let codec = MessageCodec::new(
///     &MessageDef::new(0, "Heartbeat")
///         .with_field(FieldDef::enumeration("Type", WireType::UInt8))
///         .with_field(FieldDef::primitive("CustomMode", WireType::UInt32)),
/// )?;
///
/// let value = codec.new_value().with("CustomMode", 6u32)?;
///
/// // The `uint32` sorts ahead of the `uint8` on the wire:
/// assert_eq!(codec.encode(&value, MavLinkVersion::V1)?, [6, 0, 0, 0, 0]);
/// // `MAVLink 2` strips the trailing zero byte:
/// assert_eq!(codec.encode(&value, MavLinkVersion::V2)?, [6]);
/// # Ok::<(), mavdialect::error::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct MessageCodec {
    schema: Arc<MessageSchema>,
}

impl MessageCodec {
    /// Builds a codec from a message definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema builder rejects the definition; see
    /// [`MessageSchema::new`].
    pub fn new(def: &MessageDef) -> Result<Self> {
        Ok(Self {
            schema: Arc::new(MessageSchema::new(def)?),
        })
    }

    /// Underlying message schema.
    #[inline]
    pub fn schema(&self) -> &MessageSchema {
        &self.schema
    }

    /// Message `ID`.
    #[inline]
    pub fn id(&self) -> MessageId {
        self.schema.id()
    }

    /// The `CRC_EXTRA` byte a framing layer salts its packet CRC with.
    #[inline]
    pub fn extra_crc(&self) -> CrcExtra {
        self.schema.extra_crc()
    }

    /// Creates a structured value for this message with every field at its zero/default.
    pub fn new_value(&self) -> MessageValue {
        MessageValue::new(Arc::clone(&self.schema))
    }

    /// Serializes a structured value into payload bytes.
    ///
    /// A `MAVLink 1` payload carries exactly the non-extension fields. A `MAVLink 2` payload
    /// carries all fields with trailing zero bytes stripped, but never fewer than one byte.
    ///
    /// Encoding never fails for a value created by this codec: over-long strings are silently
    /// truncated to their declared width. A value built for a different message, or a field
    /// value that bypassed validation, is reported as [`ValueError`].
    pub fn encode(&self, value: &MessageValue, version: MavLinkVersion) -> Result<Vec<u8>> {
        if value.id() != self.id() {
            return Err(ValueError::MessageMismatch {
                expected: self.id(),
                actual: value.id(),
            }
            .into());
        }

        let mut buf = vec![0u8; self.schema.payload_size(MavLinkVersion::V2)];
        let mut offset = 0;
        for &index in self.schema.wire_order() {
            let field = &self.schema.fields()[index];
            offset += put_field(&mut buf[offset..], field, &value.values()[index])?;
        }

        match version {
            MavLinkVersion::V1 => buf.truncate(self.schema.payload_size(MavLinkVersion::V1)),
            MavLinkVersion::V2 => {
                while buf.len() > 1 && buf[buf.len() - 1] == 0 {
                    buf.pop();
                }
            }
        }
        Ok(buf)
    }

    /// Parses payload bytes into a structured value.
    ///
    /// Input shorter than the expected payload size is right-padded with zero bytes; that is
    /// how `MAVLink 2` trailing-zero truncation is undone. In `MAVLink 1`, extension fields are
    /// not on the wire and stay at their zero/default in the output.
    ///
    /// # Errors
    ///
    /// [`DecodeError::EmptyPayload`] if the input is empty, [`DecodeError::PayloadTooLong`] if
    /// it exceeds the expected payload size for `version`.
    pub fn decode(&self, payload: &[u8], version: MavLinkVersion) -> Result<MessageValue> {
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload.into());
        }
        let expected = self.schema.payload_size(version);
        if payload.len() > expected {
            return Err(DecodeError::PayloadTooLong {
                len: payload.len(),
                max: expected,
            }
            .into());
        }

        let mut buf = vec![0u8; expected];
        buf[..payload.len()].copy_from_slice(payload);

        let mut value = self.new_value();
        let mut offset = 0;
        for &index in self.schema.wire_order() {
            let field = &self.schema.fields()[index];
            if version == MavLinkVersion::V1 && field.is_extension() {
                continue;
            }
            value.put(index, take_field(&buf[offset..], field));
            offset += field.wire_size();
        }
        Ok(value)
    }
}

/// Writes one field at the start of `buf`, returning its wire size.
fn put_field(buf: &mut [u8], field: &Field, value: &FieldValue) -> Result<usize> {
    let mismatch = || ValueError::TypeMismatch {
        field: field.name().to_owned(),
        wire_type: field.wire_type(),
    };

    if field.is_string() {
        let s = match value {
            FieldValue::String(s) => s,
            _ => return Err(mismatch().into()),
        };
        let bytes = s.as_bytes();
        let used = bytes.len().min(field.array_len());
        buf[..used].copy_from_slice(&bytes[..used]);
        // The remainder is already zero; over-long strings are silently truncated.
        return Ok(field.array_len());
    }

    if field.array_len() > 0 {
        let elements = match value {
            FieldValue::Array(elements) if elements.len() == field.array_len() => elements,
            _ => return Err(mismatch().into()),
        };
        let width = field.wire_type().wire_size();
        for (i, element) in elements.iter().enumerate() {
            put_scalar(&mut buf[i * width..], field.wire_type(), element).ok_or_else(mismatch)?;
        }
        return Ok(field.wire_size());
    }

    put_scalar(buf, field.wire_type(), value).ok_or_else(mismatch)?;
    Ok(field.wire_size())
}

/// Writes one scalar at the start of `buf`; `None` if the value does not match the wire type.
fn put_scalar(buf: &mut [u8], wire_type: WireType, value: &FieldValue) -> Option<()> {
    match (wire_type, value) {
        (WireType::UInt8, &FieldValue::UInt8(x)) | (WireType::Char, &FieldValue::UInt8(x)) => {
            buf[0] = x;
        }
        (WireType::Int8, &FieldValue::Int8(x)) => buf[0] = x as u8,
        (WireType::UInt16, &FieldValue::UInt16(x)) => buf[..2].copy_from_slice(&x.to_le_bytes()),
        (WireType::Int16, &FieldValue::Int16(x)) => buf[..2].copy_from_slice(&x.to_le_bytes()),
        (WireType::UInt32, &FieldValue::UInt32(x)) => buf[..4].copy_from_slice(&x.to_le_bytes()),
        (WireType::Int32, &FieldValue::Int32(x)) => buf[..4].copy_from_slice(&x.to_le_bytes()),
        (WireType::UInt64, &FieldValue::UInt64(x)) => buf[..8].copy_from_slice(&x.to_le_bytes()),
        (WireType::Int64, &FieldValue::Int64(x)) => buf[..8].copy_from_slice(&x.to_le_bytes()),
        (WireType::UInt24, &FieldValue::UInt32(x)) => wire::put_u24(buf, x),
        (WireType::UInt48, &FieldValue::UInt64(x)) => wire::put_u48(buf, x),
        (WireType::Float32, &FieldValue::Float32(x)) => {
            buf[..4].copy_from_slice(&x.to_le_bytes())
        }
        (WireType::Float64, &FieldValue::Float64(x)) => {
            buf[..8].copy_from_slice(&x.to_le_bytes())
        }
        _ => return None,
    }
    Some(())
}

/// Reads one field from the start of `buf`. The buffer is padded to the full payload size, so
/// reads cannot run short.
fn take_field(buf: &[u8], field: &Field) -> FieldValue {
    if field.is_string() {
        let run = &buf[..field.array_len()];
        let end = run.iter().position(|&b| b == 0).unwrap_or(run.len());
        return FieldValue::String(String::from_utf8_lossy(&run[..end]).into_owned());
    }

    if field.array_len() > 0 {
        let width = field.wire_type().wire_size();
        let elements = (0..field.array_len())
            .map(|i| take_scalar(&buf[i * width..], field.wire_type()))
            .collect();
        return FieldValue::Array(elements);
    }

    take_scalar(buf, field.wire_type())
}

/// Reads one scalar from the start of `buf`.
fn take_scalar(buf: &[u8], wire_type: WireType) -> FieldValue {
    match wire_type {
        WireType::UInt8 | WireType::Char => FieldValue::UInt8(buf[0]),
        WireType::Int8 => FieldValue::Int8(buf[0] as i8),
        WireType::UInt16 => FieldValue::UInt16(u16::from_le_bytes([buf[0], buf[1]])),
        WireType::Int16 => FieldValue::Int16(i16::from_le_bytes([buf[0], buf[1]])),
        WireType::UInt32 => {
            FieldValue::UInt32(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
        }
        WireType::Int32 => FieldValue::Int32(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])),
        WireType::UInt64 => FieldValue::UInt64(u64::from_le_bytes([
            buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
        ])),
        WireType::Int64 => FieldValue::Int64(i64::from_le_bytes([
            buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
        ])),
        WireType::UInt24 => FieldValue::UInt32(wire::take_u24(buf)),
        WireType::UInt48 => FieldValue::UInt64(wire::take_u48(buf)),
        WireType::Float32 => {
            FieldValue::Float32(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
        }
        WireType::Float64 => FieldValue::Float64(f64::from_le_bytes([
            buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
        ])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::protocol::FieldDef;

    fn codec() -> MessageCodec {
        MessageCodec::new(
            &MessageDef::new(7, "Status")
                .with_field(FieldDef::primitive("Flags", WireType::UInt8))
                .with_field(FieldDef::primitive("Uptime", WireType::UInt32))
                .with_field(FieldDef::primitive("Spare", WireType::UInt16).extension()),
        )
        .unwrap()
    }

    #[test]
    fn v1_payload_has_exact_base_size() {
        let codec = codec();
        let value = codec.new_value();
        let payload = codec.encode(&value, MavLinkVersion::V1).unwrap();
        assert_eq!(payload, vec![0u8; 5]);
    }

    #[test]
    fn v2_strips_trailing_zeros_to_one_byte() {
        let codec = codec();
        let value = codec.new_value();
        assert_eq!(codec.encode(&value, MavLinkVersion::V2).unwrap(), [0]);

        let value = value.with("Flags", 0xAAu8).unwrap();
        // Uptime sorts first; only the flag byte at offset 4 is nonzero.
        assert_eq!(
            codec.encode(&value, MavLinkVersion::V2).unwrap(),
            [0, 0, 0, 0, 0xAA]
        );
    }

    #[test]
    fn v1_never_carries_extensions() {
        let codec = codec();
        let value = codec.new_value().with("Spare", 0xBEEFu16).unwrap();
        let payload = codec.encode(&value, MavLinkVersion::V1).unwrap();
        assert_eq!(payload.len(), 5);

        let decoded = codec.decode(&payload, MavLinkVersion::V1).unwrap();
        assert_eq!(decoded.get("Spare"), Some(&FieldValue::UInt16(0)));
    }

    #[test]
    fn decode_restores_stripped_zeros() {
        let codec = codec();
        let value = codec.new_value().with("Uptime", 0x0102u32).unwrap();
        let payload = codec.encode(&value, MavLinkVersion::V2).unwrap();
        assert_eq!(payload, [0x02, 0x01]);
        assert!(payload.len() < codec.schema().payload_size(MavLinkVersion::V2));

        let decoded = codec.decode(&payload, MavLinkVersion::V2).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn decode_rejects_empty_payload() {
        let err = codec().decode(&[], MavLinkVersion::V2).unwrap_err();
        assert_eq!(err, Error::Decode(DecodeError::EmptyPayload));
    }

    #[test]
    fn decode_rejects_over_long_payload() {
        let codec = codec();
        let err = codec.decode(&[0u8; 8], MavLinkVersion::V2).unwrap_err();
        assert_eq!(
            err,
            Error::Decode(DecodeError::PayloadTooLong { len: 8, max: 7 })
        );

        // The v1 ceiling excludes the extension.
        let err = codec.decode(&[0u8; 6], MavLinkVersion::V1).unwrap_err();
        assert_eq!(
            err,
            Error::Decode(DecodeError::PayloadTooLong { len: 6, max: 5 })
        );
    }

    #[test]
    fn encode_rejects_foreign_value() {
        let codec = codec();
        let other = MessageCodec::new(
            &MessageDef::new(8, "Other").with_field(FieldDef::primitive("A", WireType::UInt8)),
        )
        .unwrap();
        let err = codec.encode(&other.new_value(), MavLinkVersion::V2).unwrap_err();
        assert_eq!(
            err,
            Error::Value(ValueError::MessageMismatch {
                expected: 7,
                actual: 8
            })
        );
    }

    #[test]
    fn compact_timestamp_round_trip() {
        let codec = MessageCodec::new(
            &MessageDef::new(9, "Timestamped")
                .with_field(FieldDef::primitive("BootMs", WireType::UInt24))
                .with_field(FieldDef::primitive("TimeUsec", WireType::UInt48)),
        )
        .unwrap();

        let value = codec
            .new_value()
            .with("BootMs", 0x00A1_B2C3u32)
            .unwrap()
            .with("TimeUsec", 0x0000_0102_0304_0506u64)
            .unwrap();

        let payload = codec.encode(&value, MavLinkVersion::V2).unwrap();
        // u48 sorts first (6 bytes), u24 follows, both least-significant byte first.
        assert_eq!(
            payload,
            [0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0xC3, 0xB2, 0xA1]
        );
        assert_eq!(codec.decode(&payload, MavLinkVersion::V2).unwrap(), value);
    }

    #[test]
    fn string_truncation_and_padding() {
        let codec = MessageCodec::new(
            &MessageDef::new(10, "Named").with_field(FieldDef::string("Name", 4)),
        )
        .unwrap();

        let value = codec.new_value().with("Name", "abcdef").unwrap();
        let payload = codec.encode(&value, MavLinkVersion::V1).unwrap();
        assert_eq!(payload, b"abcd");

        let short = codec.new_value().with("Name", "a").unwrap();
        assert_eq!(codec.encode(&short, MavLinkVersion::V1).unwrap(), b"a\0\0\0");
        assert_eq!(
            codec
                .decode(b"a\0\0\0", MavLinkVersion::V1)
                .unwrap()
                .get("Name")
                .unwrap()
                .as_str(),
            Some("a")
        );
    }

    #[test]
    fn string_bytes_after_first_zero_are_discarded() {
        let codec = MessageCodec::new(
            &MessageDef::new(10, "Named").with_field(FieldDef::string("Name", 4)),
        )
        .unwrap();
        let decoded = codec.decode(b"a\0bc", MavLinkVersion::V1).unwrap();
        assert_eq!(decoded.get("Name").unwrap().as_str(), Some("a"));
    }
}
