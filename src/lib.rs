/*! # Mavdialect

A low-level [MAVLink](https://mavlink.io/en/) dialect message codec written in Rust.

Mavdialect turns declarative message definitions into bit-exact payload codecs. Given a
description of a message type (its fields, their primitive types, array sizes, string lengths,
extension flags, and enumeration widths), it derives the on-wire field layout, the per-message
`CRC_EXTRA` byte, and a pair of pure encode/decode operations that convert between structured
values and the exact payload bytes of `MAVLink 1` and `MAVLink 2` frames.

The crate is intentionally narrow: transports, the outer frame (header, sequence numbers,
packet checksum, signature), and node/session management belong to a framing layer. That layer
interacts with Mavdialect only through a [`Dialect`] registry and the
[`MessageCodec`](protocol::MessageCodec) operations it hands out.

# Usage

Define a message, register it in a dialect, and encode a value:

```rust
use mavdialect::prelude::*;

fn main() -> mavdialect::error::Result<()> {
    let dialect = Dialect::new("example").with_message(
        MessageDef::new(0, "Heartbeat")
            .with_field(FieldDef::enumeration("Type", WireType::UInt8))
            .with_field(FieldDef::enumeration("Autopilot", WireType::UInt8))
            .with_field(FieldDef::enumeration("BaseMode", WireType::UInt8))
            .with_field(FieldDef::primitive("CustomMode", WireType::UInt32))
            .with_field(FieldDef::enumeration("SystemStatus", WireType::UInt8))
            .with_field(FieldDef::primitive("MavlinkVersion", WireType::UInt8)),
    )?;

    let codec = dialect.lookup(0).unwrap();

    let mut heartbeat = codec.new_value();
    heartbeat.set("Type", 1u8)?;
    heartbeat.set("CustomMode", 6u32)?;

    let payload = codec.encode(&heartbeat, MavLinkVersion::V2)?;
    let decoded = codec.decode(&payload, MavLinkVersion::V2)?;
    assert_eq!(decoded, heartbeat);
    Ok(())
}
```

A framing layer reads [`MessageCodec::id`](protocol::MessageCodec::id) and
[`MessageCodec::extra_crc`](protocol::MessageCodec::extra_crc) to seed its packet CRC, and
passes per-message payload byte slices to [`MessageCodec::decode`](protocol::MessageCodec::decode).

# Wire Layout

Payload bytes follow the MAVLink serialization rules: all primitives are little-endian,
non-extension fields are sorted by descending primitive width (stable among equals), extension
fields are appended in declaration order, `MAVLink 1` payloads exclude extensions entirely, and
`MAVLink 2` payloads strip trailing zero bytes down to a single-byte minimum. See
[`protocol`] module documentation for details.

# Feature Flags

* `serde` enables [Serde](https://serde.rs) support for protocol entities.
*/
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod consts;
pub mod error;
pub mod prelude;
pub mod protocol;

#[doc(inline)]
pub use protocol::Dialect;
