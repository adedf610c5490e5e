//! Wire types and the compact type-signature grammar.
//!
//! A [`Signature`] is the protocol's string description of an ordered
//! sequence of wire types: `"a{sv}"` is an array of string-to-variant dict
//! entries, `"(ii)"` a struct of two int32s. Signatures appear on the wire
//! inside variants and in the `Signature` header field that types a message
//! body.
//!
//! Parsing is a recursive descent over the type codes with the protocol's
//! limits enforced: at most 255 bytes of text, at most 32 levels of array
//! nesting, and at most 32 levels of struct/dict-entry nesting. Dict entries
//! are only legal as array elements and their key must be a basic type.

use std::fmt;

use crate::{errors::FormatError, value::Value};

/// Maximum byte length of a signature string on the wire (u8 length prefix).
pub const MAX_SIGNATURE_LEN: usize = 255;

/// Maximum nesting depth for arrays, and separately for structs/dict entries.
const MAX_DEPTH: usize = 32;

/// One complete wire type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// `y`: unsigned 8-bit integer.
    Byte,
    /// `b`: boolean, marshaled as a u32 restricted to 0 or 1.
    Boolean,
    /// `n`: signed 16-bit integer.
    Int16,
    /// `q`: unsigned 16-bit integer.
    Uint16,
    /// `i`: signed 32-bit integer.
    Int32,
    /// `u`: unsigned 32-bit integer.
    Uint32,
    /// `x`: signed 64-bit integer.
    Int64,
    /// `t`: unsigned 64-bit integer.
    Uint64,
    /// `d`: IEEE-754 double.
    Double,
    /// `s`: UTF-8 string.
    String,
    /// `o`: object path (string with path syntax).
    ObjectPath,
    /// `g`: type signature (string with this module's grammar).
    Signature,
    /// `v`: variant, a self-describing container for one value.
    Variant,
    /// `a<elem>`: array of one element type.
    Array(Box<Type>),
    /// `(...)`: struct of one or more member types.
    Struct(Vec<Type>),
    /// `{kv}`: dict entry; only valid as an array element.
    DictEntry(Box<Type>, Box<Type>),
}

impl Type {
    /// Wire alignment of this type, relative to the start of the message.
    #[must_use]
    pub fn alignment(&self) -> usize {
        match self {
            Type::Byte | Type::Signature | Type::Variant => 1,
            Type::Int16 | Type::Uint16 => 2,
            Type::Boolean
            | Type::Int32
            | Type::Uint32
            | Type::String
            | Type::ObjectPath
            | Type::Array(_) => 4,
            Type::Int64
            | Type::Uint64
            | Type::Double
            | Type::Struct(_)
            | Type::DictEntry(_, _) => 8,
        }
    }

    /// Whether this is a basic (non-container) type.
    ///
    /// Dict-entry keys must be basic.
    #[must_use]
    pub fn is_basic(&self) -> bool {
        !matches!(
            self,
            Type::Array(_) | Type::Struct(_) | Type::DictEntry(_, _) | Type::Variant
        )
    }

    fn write_code(&self, out: &mut String) {
        match self {
            Type::Byte => out.push('y'),
            Type::Boolean => out.push('b'),
            Type::Int16 => out.push('n'),
            Type::Uint16 => out.push('q'),
            Type::Int32 => out.push('i'),
            Type::Uint32 => out.push('u'),
            Type::Int64 => out.push('x'),
            Type::Uint64 => out.push('t'),
            Type::Double => out.push('d'),
            Type::String => out.push('s'),
            Type::ObjectPath => out.push('o'),
            Type::Signature => out.push('g'),
            Type::Variant => out.push('v'),
            Type::Array(elem) => {
                out.push('a');
                elem.write_code(out);
            },
            Type::Struct(members) => {
                out.push('(');
                for member in members {
                    member.write_code(out);
                }
                out.push(')');
            },
            Type::DictEntry(key, value) => {
                out.push('{');
                key.write_code(out);
                value.write_code(out);
                out.push('}');
            },
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut code = String::new();
        self.write_code(&mut code);
        f.write_str(&code)
    }
}

/// A validated type-signature string and its parsed type sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    text: String,
    types: Vec<Type>,
}

impl Signature {
    /// Parse and validate a signature string.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidSignature`] for text outside the
    /// grammar, [`FormatError::SignatureTooLong`] past 255 bytes, and
    /// [`FormatError::DepthLimit`] for over-deep nesting.
    pub fn parse(text: impl Into<String>) -> Result<Self, FormatError> {
        let text = text.into();
        if text.len() > MAX_SIGNATURE_LEN {
            return Err(FormatError::SignatureTooLong);
        }
        let types = parse_types(text.as_bytes())?;
        Ok(Self { text, types })
    }

    /// The empty signature, describing zero values.
    #[must_use]
    pub fn empty() -> Self {
        Self { text: String::new(), types: Vec::new() }
    }

    /// Build the signature describing a sequence of types.
    #[must_use]
    pub fn of(types: &[Type]) -> Self {
        let mut text = String::new();
        for ty in types {
            ty.write_code(&mut text);
        }
        Self { text, types: types.to_vec() }
    }

    /// Build the signature describing a sequence of values, e.g. a message
    /// body.
    #[must_use]
    pub fn for_values(values: &[Value]) -> Self {
        let types: Vec<Type> = values.iter().map(Value::wire_type).collect();
        Self::of(&types)
    }

    /// The signature text as it appears on the wire (without length or NUL).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether this signature describes zero values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The ordered sequence of types this signature describes.
    ///
    /// This is the decode side's work list: one freshly decoded value per
    /// entry.
    #[must_use]
    pub fn types(&self) -> &[Type] {
        &self.types
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn parse_types(bytes: &[u8]) -> Result<Vec<Type>, FormatError> {
    let mut pos = 0;
    let mut types = Vec::new();
    while pos < bytes.len() {
        types.push(parse_single(bytes, &mut pos, 0, 0)?);
    }
    Ok(types)
}

fn bad(bytes: &[u8]) -> FormatError {
    FormatError::InvalidSignature(String::from_utf8_lossy(bytes).into_owned())
}

/// Parse one complete type starting at `pos`.
///
/// `arrays` and `structs` track the nesting depth of the respective
/// container classes; dict entries count toward the struct depth.
fn parse_single(
    bytes: &[u8],
    pos: &mut usize,
    arrays: usize,
    structs: usize,
) -> Result<Type, FormatError> {
    let Some(&code) = bytes.get(*pos) else {
        return Err(bad(bytes));
    };
    *pos += 1;

    let ty = match code {
        b'y' => Type::Byte,
        b'b' => Type::Boolean,
        b'n' => Type::Int16,
        b'q' => Type::Uint16,
        b'i' => Type::Int32,
        b'u' => Type::Uint32,
        b'x' => Type::Int64,
        b't' => Type::Uint64,
        b'd' => Type::Double,
        b's' => Type::String,
        b'o' => Type::ObjectPath,
        b'g' => Type::Signature,
        b'v' => Type::Variant,
        b'a' => {
            if arrays + 1 > MAX_DEPTH {
                return Err(FormatError::DepthLimit);
            }
            let elem = if bytes.get(*pos) == Some(&b'{') {
                parse_dict_entry(bytes, pos, arrays + 1, structs)?
            } else {
                parse_single(bytes, pos, arrays + 1, structs)?
            };
            Type::Array(Box::new(elem))
        },
        b'(' => {
            if structs + 1 > MAX_DEPTH {
                return Err(FormatError::DepthLimit);
            }
            let mut members = Vec::new();
            loop {
                match bytes.get(*pos) {
                    // The empty struct "()" is not a type.
                    Some(&b')') if members.is_empty() => return Err(bad(bytes)),
                    Some(&b')') => {
                        *pos += 1;
                        break;
                    },
                    Some(_) => members.push(parse_single(bytes, pos, arrays, structs + 1)?),
                    None => return Err(bad(bytes)),
                }
            }
            Type::Struct(members)
        },
        _ => return Err(bad(bytes)),
    };
    Ok(ty)
}

/// Parse `{kv}` with `pos` on the opening brace.
fn parse_dict_entry(
    bytes: &[u8],
    pos: &mut usize,
    arrays: usize,
    structs: usize,
) -> Result<Type, FormatError> {
    if structs + 1 > MAX_DEPTH {
        return Err(FormatError::DepthLimit);
    }
    *pos += 1; // consume '{'
    let key = parse_single(bytes, pos, arrays, structs + 1)?;
    if !key.is_basic() {
        return Err(bad(bytes));
    }
    let value = parse_single(bytes, pos, arrays, structs + 1)?;
    if bytes.get(*pos) != Some(&b'}') {
        return Err(bad(bytes));
    }
    *pos += 1;
    Ok(Type::DictEntry(Box::new(key), Box::new(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty() {
        let sig = Signature::parse("").unwrap();
        assert!(sig.is_empty());
        assert!(sig.types().is_empty());
    }

    #[test]
    fn parse_basic_sequence() {
        let sig = Signature::parse("yius").unwrap();
        assert_eq!(sig.types(), &[Type::Byte, Type::Int32, Type::Uint32, Type::String]);
    }

    #[test]
    fn parse_containers() {
        let sig = Signature::parse("aai(sv)a{su}").unwrap();
        assert_eq!(
            sig.types(),
            &[
                Type::Array(Box::new(Type::Array(Box::new(Type::Int32)))),
                Type::Struct(vec![Type::String, Type::Variant]),
                Type::Array(Box::new(Type::DictEntry(
                    Box::new(Type::String),
                    Box::new(Type::Uint32),
                ))),
            ]
        );
    }

    #[test]
    fn render_round_trip() {
        for text in ["", "y", "a{sv}", "(iis)", "aav", "a(yv)", "xtdog"] {
            let sig = Signature::parse(text).unwrap();
            assert_eq!(Signature::of(sig.types()).as_str(), text);
        }
    }

    #[test]
    fn reject_malformed() {
        for text in ["z", "a", "(", "()", "(i", "{sv}", "a{vs}", "a{s}", "a{sii}"] {
            assert!(Signature::parse(text).is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn reject_over_limits() {
        assert_eq!(
            Signature::parse("i".repeat(256)),
            Err(FormatError::SignatureTooLong)
        );
        let deep_array = format!("{}i", "a".repeat(33));
        assert_eq!(Signature::parse(deep_array), Err(FormatError::DepthLimit));
        let deep_struct = format!("{}i{}", "(".repeat(33), ")".repeat(33));
        assert_eq!(Signature::parse(deep_struct), Err(FormatError::DepthLimit));
    }

    #[test]
    fn alignment_table() {
        assert_eq!(Type::Byte.alignment(), 1);
        assert_eq!(Type::Uint16.alignment(), 2);
        assert_eq!(Type::Boolean.alignment(), 4);
        assert_eq!(Type::String.alignment(), 4);
        assert_eq!(Type::Signature.alignment(), 1);
        assert_eq!(Type::Variant.alignment(), 1);
        assert_eq!(Type::Array(Box::new(Type::Uint64)).alignment(), 4);
        assert_eq!(Type::Struct(vec![Type::Byte]).alignment(), 8);
        assert_eq!(Type::Double.alignment(), 8);
    }
}
