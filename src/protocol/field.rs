//! Field descriptors.
//!
//! A [`FieldDef`] carries the attributes a declarative dialect source provides for one field:
//! logical name and type, plus the optional overrides (wire name, enumeration wire type, array
//! length, string length, extension flag). The schema builder normalizes each definition into a
//! [`Field`] or rejects the whole message.

use crate::error::SchemaError;
use crate::protocol::WireType;

/// Logical type of a field as declared by a dialect source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicalType {
    /// A declared wire primitive.
    Primitive(WireType),
    /// An enumeration. Requires a wire type set with [`FieldDef::with_enum_type`].
    Enum,
    /// A fixed-width string. Requires a length set with [`FieldDef::with_string_len`].
    String,
}

/// Declarative description of one message field.
///
/// # Examples
///
/// ```rust
/// use mavdialect::prelude::*;
///
/// // A 4-element float array:
/// let q = FieldDef::array("Q", WireType::Float32, 4);
///
/// // An enumeration carried as `uint8_t`:
/// let autopilot = FieldDef::enumeration("Autopilot", WireType::UInt8);
///
/// // A 25-byte string with an explicit wire name, available in `MAVLink 2` only:
/// let passkey = FieldDef::string("Passkey", 25)
///     .with_wire_name("passkey")
///     .extension();
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDef {
    name: String,
    logical: LogicalType,
    wire_name: Option<String>,
    enum_type: Option<WireType>,
    array_len: Option<usize>,
    string_len: Option<usize>,
    extension: bool,
}

impl FieldDef {
    /// Creates a field definition with a logical name and type and no optional attributes.
    pub fn new(name: impl Into<String>, logical: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical,
            wire_name: None,
            enum_type: None,
            array_len: None,
            string_len: None,
            extension: false,
        }
    }

    /// Creates a scalar field of a declared wire primitive.
    pub fn primitive(name: impl Into<String>, wire_type: WireType) -> Self {
        Self::new(name, LogicalType::Primitive(wire_type))
    }

    /// Creates an enumeration field carried on the wire as `wire_type`.
    pub fn enumeration(name: impl Into<String>, wire_type: WireType) -> Self {
        Self::new(name, LogicalType::Enum).with_enum_type(wire_type)
    }

    /// Creates a fixed-length array field of a declared wire primitive.
    pub fn array(name: impl Into<String>, wire_type: WireType, len: usize) -> Self {
        Self::new(name, LogicalType::Primitive(wire_type)).with_array_len(len)
    }

    /// Creates a fixed-width string field of `len` bytes.
    pub fn string(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, LogicalType::String).with_string_len(len)
    }

    /// Overrides the canonical wire name derived from the logical name.
    ///
    /// The wire name participates in the canonical message signature and therefore changes the
    /// `CRC_EXTRA` byte.
    pub fn with_wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = Some(wire_name.into());
        self
    }

    /// Declares the wire primitive carrying an enumeration field.
    ///
    /// The declared type wins over whatever width the enumeration's native representation might
    /// suggest; values outside the enumeration pass through unchecked.
    pub fn with_enum_type(mut self, wire_type: WireType) -> Self {
        self.enum_type = Some(wire_type);
        self
    }

    /// Declares the field as a fixed-length array of `len` elements.
    pub fn with_array_len(mut self, len: usize) -> Self {
        self.array_len = Some(len);
        self
    }

    /// Declares the fixed byte width of a string field.
    pub fn with_string_len(mut self, len: usize) -> Self {
        self.string_len = Some(len);
        self
    }

    /// Marks the field as a `MAVLink 2` extension.
    ///
    /// Extension fields are absent from `MAVLink 1` payloads and never participate in the
    /// canonical signature.
    pub fn extension(mut self) -> Self {
        self.extension = true;
        self
    }

    /// Logical name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical type as declared.
    pub fn logical(&self) -> LogicalType {
        self.logical
    }

    /// Returns `true` if the field is a `MAVLink 2` extension.
    pub fn is_extension(&self) -> bool {
        self.extension
    }

    /// Resolves the declarative attributes into a normalized [`Field`].
    pub(crate) fn normalize(&self) -> Result<Field, SchemaError> {
        let wire_type = match self.logical {
            LogicalType::Primitive(wire_type) => self.enum_type.unwrap_or(wire_type),
            LogicalType::Enum => self
                .enum_type
                .ok_or_else(|| SchemaError::MissingEnumType(self.name.clone()))?,
            LogicalType::String => WireType::Char,
        };

        let array_len = match self.logical {
            LogicalType::String => self
                .string_len
                .ok_or_else(|| SchemaError::MissingStringLength(self.name.clone()))?,
            _ if wire_type == WireType::Char => {
                // char reaches the wire only through fixed-width strings
                self.string_len
                    .or(self.array_len)
                    .ok_or_else(|| SchemaError::MissingStringLength(self.name.clone()))?
            }
            _ => self.array_len.unwrap_or(0),
        };

        Ok(Field {
            name: self.name.clone(),
            wire_name: self
                .wire_name
                .clone()
                .unwrap_or_else(|| wire_name(&self.name)),
            wire_type,
            array_len,
            extension: self.extension,
            enum_backed: self.logical == LogicalType::Enum,
        })
    }
}

/// Normalized description of one message field.
///
/// Produced by the schema builder from a [`FieldDef`]; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    name: String,
    wire_name: String,
    wire_type: WireType,
    array_len: usize,
    extension: bool,
    enum_backed: bool,
}

impl Field {
    /// Logical name as declared.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical wire name used in the message signature.
    #[inline]
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Primitive type of one element on the wire.
    #[inline]
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// Number of array elements, or `0` for a scalar.
    ///
    /// Strings are [`WireType::Char`] arrays of their declared byte length.
    #[inline]
    pub fn array_len(&self) -> usize {
        self.array_len
    }

    /// Returns `true` if the field is a `MAVLink 2` extension.
    #[inline]
    pub fn is_extension(&self) -> bool {
        self.extension
    }

    /// Returns `true` if the field carries an enumeration value.
    #[inline]
    pub fn is_enum(&self) -> bool {
        self.enum_backed
    }

    /// Returns `true` if the field is a fixed-width string.
    #[inline]
    pub fn is_string(&self) -> bool {
        self.wire_type == WireType::Char
    }

    /// Total width of the field on the wire, in bytes.
    pub fn wire_size(&self) -> usize {
        self.wire_type.wire_size() * self.array_len.max(1)
    }
}

/// Derives the canonical wire name from a logical field name.
///
/// An underscore is inserted before every interior uppercase letter, then the whole name is
/// lowercased. Digits are kept attached to the preceding run (`ErrorsCount1` becomes
/// `errors_count1`), which the established `CRC_EXTRA` values depend on.
pub(crate) fn wire_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_name_derivation() {
        assert_eq!(wire_name("CustomMode"), "custom_mode");
        assert_eq!(wire_name("TimeUsec"), "time_usec");
        assert_eq!(wire_name("Rssi"), "rssi");
        assert_eq!(wire_name("FlowCompMX"), "flow_comp_m_x");
        assert_eq!(wire_name("OmegaIx"), "omega_ix");
    }

    #[test]
    fn wire_name_keeps_digit_runs() {
        assert_eq!(wire_name("ErrorsCount1"), "errors_count1");
        assert_eq!(wire_name("Tune2"), "tune2");
        assert_eq!(wire_name("Gps2Raw"), "gps2_raw");
    }

    #[test]
    fn wire_name_override_wins() {
        let field = FieldDef::primitive("OmegaIx", WireType::Float32)
            .with_wire_name("omegaIx")
            .normalize()
            .unwrap();
        assert_eq!(field.wire_name(), "omegaIx");
    }

    #[test]
    fn string_normalizes_to_char_array() {
        let field = FieldDef::string("Passkey", 25).normalize().unwrap();
        assert_eq!(field.wire_type(), WireType::Char);
        assert_eq!(field.array_len(), 25);
        assert_eq!(field.wire_size(), 25);
        assert!(field.is_string());
    }

    #[test]
    fn string_without_length_is_rejected() {
        let err = FieldDef::new("Passkey", LogicalType::String)
            .normalize()
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingStringLength("Passkey".into()));
    }

    #[test]
    fn bare_char_is_rejected() {
        let err = FieldDef::primitive("Letter", WireType::Char)
            .normalize()
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingStringLength("Letter".into()));
    }

    #[test]
    fn enum_without_wire_type_is_rejected() {
        let err = FieldDef::new("Type", LogicalType::Enum)
            .normalize()
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingEnumType("Type".into()));
    }

    #[test]
    fn enum_type_overrides_width() {
        let field = FieldDef::enumeration("OnboardControlSensorsPresent", WireType::UInt32)
            .normalize()
            .unwrap();
        assert_eq!(field.wire_type(), WireType::UInt32);
        assert!(field.is_enum());
        assert_eq!(field.wire_size(), 4);
    }

    #[test]
    fn array_width_uses_per_element_size() {
        let field = FieldDef::array("Covariance", WireType::Float32, 9)
            .normalize()
            .unwrap();
        assert_eq!(field.array_len(), 9);
        assert_eq!(field.wire_size(), 36);
        assert_eq!(field.wire_type().wire_size(), 4);
    }
}
