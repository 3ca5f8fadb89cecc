//! Message definitions and the schema builder.
//!
//! A [`MessageDef`] is the declarative input a dialect source provides. The schema builder
//! turns it into an immutable [`MessageSchema`]: normalized fields, the on-wire field order,
//! payload sizes, and the `CRC_EXTRA` byte. A schema is constructed once per message type at
//! registration time; codecs share it for the lifetime of the registry.

use std::cmp::Reverse;

use crate::consts::{MESSAGE_ID_MAX, PAYLOAD_MAX_SIZE};
use crate::error::{Result, SchemaError};
use crate::protocol::field::wire_name;
use crate::protocol::{CrcExtra, Field, FieldDef, MavLinkVersion, MessageId, X25Crc};

/// Declarative description of one message type.
///
/// Fields are listed in declaration order, extensions last. The definition itself performs no
/// validation; [`MessageSchema::new`] does.
///
/// # Examples
///
/// ```rust
/// use mavdialect::prelude::*;
///
/// let def = MessageDef::new(163, "Ahrs")
///     .with_field(FieldDef::primitive("OmegaIx", WireType::Float32).with_wire_name("omegaIx"))
///     .with_field(FieldDef::primitive("AccelWeight", WireType::Float32))
///     .with_field(FieldDef::primitive("ErrorRp", WireType::Float32));
///
/// let schema = MessageSchema::new(&def)?;
/// assert_eq!(schema.id(), 163);
/// assert_eq!(schema.wire_name(), "AHRS");
/// # Ok::<(), mavdialect::error::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageDef {
    id: MessageId,
    name: String,
    fields: Vec<FieldDef>,
}

impl MessageDef {
    /// Creates an empty message definition with an `id` and a logical `name`.
    ///
    /// The logical name is the bare message name (`"Heartbeat"`, `"AttitudeQuaternionCov"`);
    /// its snake_case form, uppercased, becomes the message wire name used in the canonical
    /// signature.
    pub fn new(id: MessageId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field in declaration order.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends several fields in declaration order.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Message `ID`.
    #[inline]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Logical message name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields.
    #[inline]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }
}

/// Immutable schema of one message type.
///
/// Holds everything the codec needs to serialize the message: the declared field list, the
/// wire field order (non-extension fields stable-sorted by descending element width, extension
/// fields appended in declaration order), the non-extension and total payload sizes, and the
/// `CRC_EXTRA` byte derived from the canonical signature.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageSchema {
    id: MessageId,
    name: String,
    wire_name: String,
    fields: Vec<Field>,
    wire_order: Vec<usize>,
    extra_crc: CrcExtra,
    base_size: usize,
    full_size: usize,
}

impl MessageSchema {
    /// Builds a schema from a message definition.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] wrapped into [`Error`](crate::error::Error) if the definition is
    /// malformed: a non-extension field follows an extension field, a string lacks its length,
    /// an enumeration lacks its wire type, the `ID` exceeds 24 bits, or the total payload size
    /// exceeds 255 bytes.
    pub fn new(def: &MessageDef) -> Result<Self> {
        if def.id() > MESSAGE_ID_MAX {
            return Err(SchemaError::IdOutOfRange(def.id()).into());
        }

        let mut fields = Vec::with_capacity(def.fields().len());
        let mut seen_extension = false;
        for field_def in def.fields() {
            let field = field_def.normalize()?;
            if field.is_extension() {
                seen_extension = true;
            } else if seen_extension {
                return Err(SchemaError::ExtensionOrder(field.name().to_owned()).into());
            }
            fields.push(field);
        }

        let mut wire_order: Vec<usize> = (0..fields.len())
            .filter(|&i| !fields[i].is_extension())
            .collect();
        // Stable by construction: equal widths keep declaration order. The sort key is the
        // per-element width, so arrays do not widen it.
        wire_order.sort_by_key(|&i| Reverse(fields[i].wire_type().wire_size()));
        wire_order.extend((0..fields.len()).filter(|&i| fields[i].is_extension()));

        let base_size: usize = fields
            .iter()
            .filter(|f| !f.is_extension())
            .map(Field::wire_size)
            .sum();
        let full_size: usize = fields.iter().map(Field::wire_size).sum();
        if full_size > PAYLOAD_MAX_SIZE {
            return Err(SchemaError::PayloadOverflow {
                size: full_size,
                max: PAYLOAD_MAX_SIZE,
            }
            .into());
        }

        let msg_wire_name = wire_name(def.name()).to_ascii_uppercase();
        let extra_crc = extra_crc(&msg_wire_name, &wire_order, &fields);

        Ok(Self {
            id: def.id(),
            name: def.name().to_owned(),
            wire_name: msg_wire_name,
            fields,
            wire_order,
            extra_crc,
            base_size,
            full_size,
        })
    }

    /// Message `ID`.
    #[inline]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Logical message name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Message wire name used in the canonical signature.
    #[inline]
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// The `CRC_EXTRA` byte of this schema.
    ///
    /// Depends only on the schema, never on values.
    #[inline]
    pub fn extra_crc(&self) -> CrcExtra {
        self.extra_crc
    }

    /// Declared fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields in on-wire order.
    pub fn wire_fields(&self) -> impl Iterator<Item = &Field> {
        self.wire_order.iter().map(|&i| &self.fields[i])
    }

    /// Payload size in bytes before `MAVLink 2` trailing-zero truncation.
    ///
    /// `MAVLink 1` payloads exclude extension fields and always have exactly this length;
    /// `MAVLink 2` payloads include all fields and carry between 1 byte and this length.
    pub fn payload_size(&self, version: MavLinkVersion) -> usize {
        match version {
            MavLinkVersion::V1 => self.base_size,
            MavLinkVersion::V2 => self.full_size,
        }
    }

    /// Indices into [`MessageSchema::fields`] in on-wire order.
    pub(crate) fn wire_order(&self) -> &[usize] {
        &self.wire_order
    }

    /// Index of the field with logical name `name`, if any.
    pub(crate) fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }
}

/// Computes the `CRC_EXTRA` byte from the canonical message signature.
///
/// The signature is the message wire name followed by the sorted non-extension fields, each as
/// its signature type name and wire name, all space-terminated; array lengths are accumulated
/// as a single raw byte. Extension fields never participate.
fn extra_crc(msg_wire_name: &str, wire_order: &[usize], fields: &[Field]) -> CrcExtra {
    let mut crc = X25Crc::new();
    crc.accumulate(msg_wire_name.as_bytes());
    crc.accumulate(b" ");
    for &i in wire_order {
        let field = &fields[i];
        if field.is_extension() {
            break;
        }
        crc.accumulate(field.wire_type().signature_name().as_bytes());
        crc.accumulate(b" ");
        crc.accumulate(field.wire_name().as_bytes());
        crc.accumulate(b" ");
        if field.array_len() > 0 {
            crc.accumulate_byte(field.array_len() as u8);
        }
    }
    let crc = crc.get();
    ((crc & 0xFF) ^ (crc >> 8)) as CrcExtra
}
