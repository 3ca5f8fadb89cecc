//! Mavdialect errors.
//!
//! All fallible operations in this crate return [`Result`]. Errors are values: the codec never
//! logs, never retries, and never mutates shared state on failure. It is up to the framing layer
//! to decide whether a condition is dropped, logged, or surfaced.

use thiserror::Error;

use crate::protocol::{MessageId, WireType};

/// Common result type returned by Mavdialect entities.
pub type Result<T> = core::result::Result<T, Error>;

/// All errors generated by Mavdialect.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed message definition rejected by the schema builder.
    #[error("invalid message schema: {0}")]
    Schema(#[from] SchemaError),

    /// Payload bytes rejected by the decoder.
    #[error("invalid payload: {0}")]
    Decode(#[from] DecodeError),

    /// Structured value does not fit the schema it is used with.
    #[error("invalid field value: {0}")]
    Value(#[from] ValueError),

    /// Attempt to register a second message with the same `ID` in a dialect.
    #[error("message ID {0} is already registered in this dialect")]
    DuplicateMessageId(MessageId),
}

/// Conditions under which a message definition is rejected.
///
/// A definition that triggers any of these is unusable: [`Dialect`](crate::protocol::Dialect)
/// will never hand out a codec for it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A non-extension field was declared after an extension field.
    ///
    /// Extension fields always form the tail of a message definition.
    #[error("non-extension field `{0}` follows an extension field")]
    ExtensionOrder(String),

    /// A string (or bare `char`) field does not declare its fixed byte length.
    #[error("string field `{0}` does not declare a length")]
    MissingStringLength(String),

    /// An enumeration field does not declare the primitive carrying it on the wire.
    #[error("enum field `{0}` does not declare a wire type")]
    MissingEnumType(String),

    /// Message `ID` does not fit into 24 bits.
    #[error("message ID {0} exceeds the 24-bit maximum")]
    IdOutOfRange(MessageId),

    /// Total payload size exceeds what a frame length byte can carry.
    #[error("payload size of {size} bytes exceeds the {max}-byte maximum")]
    PayloadOverflow {
        /// Total payload size of the rejected definition.
        size: usize,
        /// Maximum payload size a frame can carry.
        max: usize,
    },
}

/// Conditions under which payload bytes are rejected by the decoder.
///
/// A `MAVLink 2` payload *shorter* than the schema total is not an error: senders strip
/// trailing zero bytes and the decoder restores them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input is longer than the schema payload size for the requested protocol version.
    #[error("payload of {len} bytes exceeds the expected {max} bytes")]
    PayloadTooLong {
        /// Actual input length.
        len: usize,
        /// Expected payload size.
        max: usize,
    },

    /// Input is empty. Every payload carries at least one byte.
    #[error("payload is empty")]
    EmptyPayload,
}

/// Conditions under which a structured value is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The message has no field with the requested logical name.
    #[error("message has no field named `{0}`")]
    NoSuchField(String),

    /// The provided value does not match the field's declared wire type.
    #[error("value for field `{field}` does not match wire type `{wire_type}`")]
    TypeMismatch {
        /// Logical name of the field.
        field: String,
        /// Wire type the field is declared with.
        wire_type: WireType,
    },

    /// An array value does not have exactly the declared number of elements.
    #[error("array for field `{field}` must have {expected} elements, got {actual}")]
    ArrayLength {
        /// Logical name of the field.
        field: String,
        /// Declared array length.
        expected: usize,
        /// Number of elements provided.
        actual: usize,
    },

    /// The value was built for a different message than the codec it was passed to.
    #[error("value belongs to message ID {actual}, codec expects {expected}")]
    MessageMismatch {
        /// Message `ID` of the codec.
        expected: MessageId,
        /// Message `ID` the value was created for.
        actual: MessageId,
    },
}
