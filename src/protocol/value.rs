//! Structured message values.
//!
//! The codec is table-driven: instead of generated per-message structs, a [`MessageValue`] is a
//! schema-shaped container of [`FieldValue`]s. Values are validated when they are set, so the
//! encoder can treat a well-formed value as total input.

use std::sync::Arc;

use crate::error::{Result, ValueError};
use crate::protocol::{Field, MessageId, MessageSchema, WireType};

/// Value of a single message field.
///
/// Integer variants correspond one-to-one to wire primitives; the compact
/// [`UInt24`](WireType::UInt24) and [`UInt48`](WireType::UInt48) forms are carried in
/// [`FieldValue::UInt32`] and [`FieldValue::UInt64`]. Enumeration fields carry the numeric
/// value of their declared wire primitive, so unknown enumeration values round-trip untouched.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    /// `uint8_t` value.
    UInt8(u8),
    /// `int8_t` value.
    Int8(i8),
    /// `uint16_t` value.
    UInt16(u16),
    /// `int16_t` value.
    Int16(i16),
    /// `uint32_t` value; also carries [`WireType::UInt24`] fields.
    UInt32(u32),
    /// `int32_t` value.
    Int32(i32),
    /// `uint64_t` value; also carries [`WireType::UInt48`] fields.
    UInt64(u64),
    /// `int64_t` value.
    Int64(i64),
    /// `float` value.
    Float32(f32),
    /// `double` value.
    Float64(f64),
    /// Fixed-width string value. May be shorter than the declared width (zero-padded on the
    /// wire) or longer (silently truncated on encode).
    String(String),
    /// Fixed-length array of scalar values.
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Zero/default value for a normalized field.
    pub(crate) fn default_for(field: &Field) -> Self {
        if field.is_string() {
            return FieldValue::String(String::new());
        }
        let scalar = Self::default_scalar(field.wire_type());
        if field.array_len() > 0 {
            FieldValue::Array(vec![scalar; field.array_len()])
        } else {
            scalar
        }
    }

    fn default_scalar(wire_type: WireType) -> Self {
        match wire_type {
            WireType::UInt8 | WireType::Char => FieldValue::UInt8(0),
            WireType::Int8 => FieldValue::Int8(0),
            WireType::UInt16 => FieldValue::UInt16(0),
            WireType::Int16 => FieldValue::Int16(0),
            WireType::UInt32 | WireType::UInt24 => FieldValue::UInt32(0),
            WireType::Int32 => FieldValue::Int32(0),
            WireType::UInt64 | WireType::UInt48 => FieldValue::UInt64(0),
            WireType::Int64 => FieldValue::Int64(0),
            WireType::Float32 => FieldValue::Float32(0.0),
            WireType::Float64 => FieldValue::Float64(0.0),
        }
    }

    /// Returns `true` if this is a scalar of the given wire type.
    pub(crate) fn matches_scalar(&self, wire_type: WireType) -> bool {
        matches!(
            (wire_type, self),
            (WireType::UInt8, FieldValue::UInt8(_))
                | (WireType::Int8, FieldValue::Int8(_))
                | (WireType::UInt16, FieldValue::UInt16(_))
                | (WireType::Int16, FieldValue::Int16(_))
                | (WireType::UInt32, FieldValue::UInt32(_))
                | (WireType::UInt24, FieldValue::UInt32(_))
                | (WireType::Int32, FieldValue::Int32(_))
                | (WireType::UInt64, FieldValue::UInt64(_))
                | (WireType::UInt48, FieldValue::UInt64(_))
                | (WireType::Int64, FieldValue::Int64(_))
                | (WireType::Float32, FieldValue::Float32(_))
                | (WireType::Float64, FieldValue::Float64(_))
        )
    }

    /// Validates this value against a normalized field.
    pub(crate) fn validate(&self, field: &Field) -> core::result::Result<(), ValueError> {
        let mismatch = || ValueError::TypeMismatch {
            field: field.name().to_owned(),
            wire_type: field.wire_type(),
        };

        if field.is_string() {
            return match self {
                FieldValue::String(_) => Ok(()),
                _ => Err(mismatch()),
            };
        }

        if field.array_len() > 0 {
            let elements = match self {
                FieldValue::Array(elements) => elements,
                _ => return Err(mismatch()),
            };
            if elements.len() != field.array_len() {
                return Err(ValueError::ArrayLength {
                    field: field.name().to_owned(),
                    expected: field.array_len(),
                    actual: elements.len(),
                });
            }
            if !elements.iter().all(|e| e.matches_scalar(field.wire_type())) {
                return Err(mismatch());
            }
            return Ok(());
        }

        if self.matches_scalar(field.wire_type()) {
            Ok(())
        } else {
            Err(mismatch())
        }
    }

    /// Returns the string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the array elements, if this is an array value.
    pub fn as_slice(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Returns the value widened to `u64`, if this is an unsigned integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            FieldValue::UInt8(x) => Some(x as u64),
            FieldValue::UInt16(x) => Some(x as u64),
            FieldValue::UInt32(x) => Some(x as u64),
            FieldValue::UInt64(x) => Some(x),
            _ => None,
        }
    }

    /// Returns the value widened to `i64`, if this is a signed integer.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            FieldValue::Int8(x) => Some(x as i64),
            FieldValue::Int16(x) => Some(x as i64),
            FieldValue::Int32(x) => Some(x as i64),
            FieldValue::Int64(x) => Some(x),
            _ => None,
        }
    }

    /// Returns the value as `f64`, if this is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FieldValue::Float32(x) => Some(x as f64),
            FieldValue::Float64(x) => Some(x),
            _ => None,
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident,)*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar! {
    u8 => UInt8,
    i8 => Int8,
    u16 => UInt16,
    i16 => Int16,
    u32 => UInt32,
    i32 => Int32,
    u64 => UInt64,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => String,
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_owned())
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue> + Clone> From<&[T]> for FieldValue {
    fn from(values: &[T]) -> Self {
        FieldValue::Array(values.iter().cloned().map(Into::into).collect())
    }
}

/// Structured value of one message.
///
/// Created through [`MessageCodec::new_value`](crate::protocol::MessageCodec::new_value) with
/// every field at its zero/default; fields are addressed by their logical name. Two values are
/// equal when they belong to the same message `ID` and all their fields are equal.
///
/// # Examples
///
/// ```rust
/// use mavdialect::prelude::*;
///
/// let codec = MessageCodec::new(
///     &MessageDef::new(5, "ChangeOperatorControl")
///         .with_field(FieldDef::primitive("TargetSystem", WireType::UInt8))
///         .with_field(FieldDef::string("Passkey", 25)),
/// )?;
///
/// let mut value = codec
///     .new_value()
///     .with("TargetSystem", 1u8)?
///     .with("Passkey", "testing")?;
///
/// assert_eq!(value.get("Passkey").unwrap().as_str(), Some("testing"));
/// assert!(value.set("Passkey", 1u32).is_err());
/// # Ok::<(), mavdialect::error::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct MessageValue {
    schema: Arc<MessageSchema>,
    values: Vec<FieldValue>,
}

impl MessageValue {
    /// Creates a value with every field at its zero/default.
    pub(crate) fn new(schema: Arc<MessageSchema>) -> Self {
        let values = schema.fields().iter().map(FieldValue::default_for).collect();
        Self { schema, values }
    }

    /// Schema this value conforms to.
    #[inline]
    pub fn schema(&self) -> &MessageSchema {
        &self.schema
    }

    /// Message `ID` this value belongs to.
    #[inline]
    pub fn id(&self) -> MessageId {
        self.schema.id()
    }

    /// Returns the value of the field with logical name `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema.field_index(name).map(|i| &self.values[i])
    }

    /// Sets the field with logical name `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] wrapped into [`Error`](crate::error::Error) if the message has no
    /// such field, the value's type does not match the field's wire type, or an array value has
    /// the wrong number of elements. Strings of any length are accepted; the encoder truncates
    /// them to the declared width.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let index = self
            .schema
            .field_index(name)
            .ok_or_else(|| ValueError::NoSuchField(name.to_owned()))?;
        let value = value.into();
        value.validate(&self.schema.fields()[index])?;
        self.values[index] = value;
        Ok(())
    }

    /// Sets the field with logical name `name`, consuming and returning `self`.
    ///
    /// Fluent form of [`MessageValue::set`] for building values in one expression.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Field values in declaration order.
    pub(crate) fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// Replaces the field at `index` without validation; decoder-internal.
    pub(crate) fn put(&mut self, index: usize, value: FieldValue) {
        self.values[index] = value;
    }
}

impl PartialEq for MessageValue {
    fn eq(&self, other: &Self) -> bool {
        self.schema.id() == other.schema.id() && self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{FieldDef, MessageDef};

    fn schema() -> Arc<MessageSchema> {
        Arc::new(
            MessageSchema::new(
                &MessageDef::new(61, "AttitudeQuaternionCov")
                    .with_field(FieldDef::primitive("TimeUsec", WireType::UInt64))
                    .with_field(FieldDef::array("Q", WireType::Float32, 4))
                    .with_field(FieldDef::string("Label", 8))
                    .with_field(FieldDef::enumeration("Source", WireType::UInt8)),
            )
            .unwrap(),
        )
    }

    #[test]
    fn defaults_are_zeroed() {
        let value = MessageValue::new(schema());
        assert_eq!(value.get("TimeUsec"), Some(&FieldValue::UInt64(0)));
        assert_eq!(
            value.get("Q"),
            Some(&FieldValue::Array(vec![FieldValue::Float32(0.0); 4]))
        );
        assert_eq!(value.get("Label"), Some(&FieldValue::String(String::new())));
        assert_eq!(value.get("Source"), Some(&FieldValue::UInt8(0)));
    }

    #[test]
    fn set_validates_scalar_type() {
        let mut value = MessageValue::new(schema());
        value.set("TimeUsec", 42u64).unwrap();
        assert_eq!(value.get("TimeUsec"), Some(&FieldValue::UInt64(42)));

        let err = value.set("TimeUsec", 42u32).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Value(ValueError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn set_validates_array_length() {
        let mut value = MessageValue::new(schema());
        value.set("Q", vec![1.0f32, 0.0, 0.0, 0.0]).unwrap();

        let err = value.set("Q", vec![1.0f32, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Value(ValueError::ArrayLength {
                expected: 4,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn set_rejects_unknown_field() {
        let mut value = MessageValue::new(schema());
        let err = value.set("Nope", 1u8).unwrap_err();
        assert_eq!(
            err,
            crate::error::Error::Value(ValueError::NoSuchField("Nope".into()))
        );
    }

    #[test]
    fn strings_of_any_length_are_accepted() {
        let mut value = MessageValue::new(schema());
        value.set("Label", "much longer than eight bytes").unwrap();
        assert_eq!(
            value.get("Label").unwrap().as_str(),
            Some("much longer than eight bytes")
        );
    }

    #[test]
    fn values_compare_by_id_and_content() {
        let a = MessageValue::new(schema()).with("Source", 3u8).unwrap();
        let b = MessageValue::new(schema()).with("Source", 3u8).unwrap();
        let c = MessageValue::new(schema());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
