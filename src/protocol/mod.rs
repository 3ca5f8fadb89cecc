//! MAVLink dialect protocol entities.
//!
//! The pipeline from a declarative definition to payload bytes:
//!
//! 1. [`MessageDef`] describes a message the way an XML dialect definition would: fields in
//!    declaration order, each with a logical type and optional attributes.
//! 2. [`MessageSchema`] is the immutable product of the schema builder: normalized fields, the
//!    on-wire field order, payload sizes, and the `CRC_EXTRA` byte.
//! 3. [`MessageCodec`] drives the generic encoder/decoder from the schema table and converts
//!    between [`MessageValue`] and payload bytes for either protocol version.
//! 4. [`Dialect`] maps message `ID`s to codecs; it is the only entity a framing layer consumes.

pub mod codec;
pub mod crc;
pub mod dialect;
pub mod field;
pub mod schema;
pub mod value;
pub mod wire;

#[doc(inline)]
pub use codec::MessageCodec;
#[doc(inline)]
pub use crc::X25Crc;
#[doc(inline)]
pub use dialect::Dialect;
#[doc(inline)]
pub use field::{Field, FieldDef, LogicalType};
#[doc(inline)]
pub use schema::{MessageDef, MessageSchema};
#[doc(inline)]
pub use value::{FieldValue, MessageValue};
#[doc(inline)]
pub use wire::WireType;

/// MAVLink message `ID`.
///
/// Occupies 24 bits on the wire; values above [`MESSAGE_ID_MAX`](crate::consts::MESSAGE_ID_MAX)
/// are rejected by the schema builder.
pub type MessageId = u32;

/// Per-message CRC seed.
///
/// A byte derived from the canonical message signature that a framing layer feeds into its
/// packet CRC-16, so that schema drift between peers fails at the framing stage instead of
/// decoding to garbage.
pub type CrcExtra = u8;

/// MAVLink protocol version.
///
/// Selects the payload convention used by [`MessageCodec::encode`] and
/// [`MessageCodec::decode`]: `MAVLink 1` payloads carry non-extension fields only and have a
/// fixed length, `MAVLink 2` payloads carry all fields with trailing zero bytes stripped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MavLinkVersion {
    /// `MAVLink 1` protocol version.
    V1,
    /// `MAVLink 2` protocol version.
    V2,
}
