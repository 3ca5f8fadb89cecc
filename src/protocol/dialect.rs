//! Dialect registry.
//!
//! A dialect is a named collection of message codecs sharing an id space. It is populated once
//! at startup and read-only afterwards; since every codec is immutable, concurrent readers need
//! no locking. This registry is the only entity a framing layer consumes: it extracts
//! (message `ID`, payload bytes, version) from a frame and asks the dialect for the codec.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use crate::error::{Error, Result};
use crate::protocol::{MessageCodec, MessageDef, MessageId};

/// Registry of message codecs keyed by message `ID`.
///
/// # Examples
///
/// ```rust
/// use mavdialect::prelude::*;
///
/// let dialect = Dialect::new("minimal")
///     .with_message(
///         MessageDef::new(0, "Heartbeat")
///             .with_field(FieldDef::primitive("CustomMode", WireType::UInt32)),
///     )?
///     .with_message(
///         MessageDef::new(300, "ProtocolVersion")
///             .with_field(FieldDef::primitive("Version", WireType::UInt16)),
///     )?;
///
/// assert!(dialect.lookup(0).is_some());
/// // An unknown `ID` is a distinguished value, not an error; the framing
/// // layer decides what to do with such frames.
/// assert!(dialect.lookup(42).is_none());
/// # Ok::<(), mavdialect::error::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct Dialect {
    name: String,
    messages: HashMap<MessageId, MessageCodec>,
}

impl Dialect {
    /// Creates an empty dialect with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: HashMap::new(),
        }
    }

    /// Builds a codec from `def` and registers it, returning the dialect.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the definition is malformed, or
    /// [`Error::DuplicateMessageId`] if the `ID` is already taken.
    pub fn with_message(mut self, def: MessageDef) -> Result<Self> {
        self.register(MessageCodec::new(&def)?)?;
        Ok(self)
    }

    /// Registers a codec under its message `ID`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateMessageId`] if the `ID` is already taken.
    pub fn register(&mut self, codec: MessageCodec) -> Result<()> {
        if self.messages.contains_key(&codec.id()) {
            return Err(Error::DuplicateMessageId(codec.id()));
        }
        log::debug!(
            "dialect '{}': registered message #{} ({})",
            self.name,
            codec.id(),
            codec.schema().wire_name()
        );
        self.messages.insert(codec.id(), codec);
        Ok(())
    }

    /// Returns the codec registered for `id`, if any.
    ///
    /// `None` is the unknown-message sentinel a framing layer handles; it is never raised as an
    /// error.
    pub fn lookup(&self, id: MessageId) -> Option<&MessageCodec> {
        self.messages.get(&id)
    }

    /// Returns `true` if a message with the given `ID` is registered.
    #[inline]
    pub fn contains(&self, id: MessageId) -> bool {
        self.messages.contains_key(&id)
    }

    /// Dialect name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if no messages are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Registered codecs, in no particular order.
    pub fn messages(&self) -> impl Iterator<Item = &MessageCodec> {
        self.messages.values()
    }
}

impl Debug for Dialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<MessageId> = self.messages.keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("messages", &ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{FieldDef, WireType};

    fn heartbeat() -> MessageDef {
        MessageDef::new(0, "Heartbeat")
            .with_field(FieldDef::primitive("CustomMode", WireType::UInt32))
    }

    #[test]
    fn lookup_hits_and_misses() {
        let dialect = Dialect::new("test").with_message(heartbeat()).unwrap();
        assert_eq!(dialect.lookup(0).unwrap().id(), 0);
        assert!(dialect.lookup(1).is_none());
        assert!(dialect.contains(0));
        assert_eq!(dialect.len(), 1);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let err = Dialect::new("test")
            .with_message(heartbeat())
            .unwrap()
            .with_message(MessageDef::new(0, "Impostor").with_field(FieldDef::primitive(
                "Value",
                WireType::UInt8,
            )))
            .unwrap_err();
        assert_eq!(err, Error::DuplicateMessageId(0));
    }

    #[test]
    fn malformed_definition_is_refused() {
        let err = Dialect::new("test")
            .with_message(
                MessageDef::new(1, "Broken")
                    .with_field(FieldDef::primitive("A", WireType::UInt8).extension())
                    .with_field(FieldDef::primitive("B", WireType::UInt8)),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn messages_iterates_over_codecs() {
        let dialect = Dialect::new("test")
            .with_message(heartbeat())
            .unwrap()
            .with_message(
                MessageDef::new(1, "SysStatus")
                    .with_field(FieldDef::primitive("Load", WireType::UInt16)),
            )
            .unwrap();
        let mut ids: Vec<MessageId> = dialect.messages().map(MessageCodec::id).collect();
        ids.sort_unstable();
        assert_eq!(ids, [0, 1]);
    }
}
