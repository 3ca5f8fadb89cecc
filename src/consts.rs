//! Mavdialect constants.

use crate::protocol::MessageId;

/// Maximum value of a MAVLink message `ID`.
///
/// Message identifiers occupy 24 bits in a `MAVLink 2` frame.
pub const MESSAGE_ID_MAX: MessageId = 0xFFFFFF;

/// Maximum size of a message payload in bytes.
///
/// The payload length field of a MAVLink frame is a single byte.
pub const PAYLOAD_MAX_SIZE: usize = 255;
