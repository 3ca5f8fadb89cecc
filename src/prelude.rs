//! Basic entities for Mavdialect.

pub use crate::error::{DecodeError, Error, Result, SchemaError, ValueError};

pub use crate::protocol::{
    CrcExtra, Dialect, FieldDef, FieldValue, LogicalType, MavLinkVersion, MessageCodec,
    MessageDef, MessageId, MessageSchema, MessageValue, WireType,
};
