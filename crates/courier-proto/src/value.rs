//! Dynamically typed wire values.
//!
//! [`Value`] is a closed sum over every type the wire format can carry, so
//! validation and marshaling are exhaustive matches rather than runtime type
//! inspection. [`Variant`] is the wire-level wrapper holding exactly one
//! value plus (via the value itself) its type; header fields store variants,
//! while a message body stores plain values: the one level of unwrapping
//! the pipelines perform at their boundary.

use std::fmt;

use crate::{
    names,
    signature::{Signature, Type},
};

/// An object path: a string under the slash-separated path grammar.
///
/// Construction does not validate; syntax is enforced where the protocol
/// requires it, by [`Message::validate`](crate::Message::validate) on the
/// Path header. [`ObjectPath::is_valid`] is available to callers that want
/// to check early.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Wrap a string as an object path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the text satisfies object-path syntax.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        names::is_valid_object_path(&self.0)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// One wire value of any type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `y`
    Byte(u8),
    /// `b`
    Boolean(bool),
    /// `n`
    Int16(i16),
    /// `q`
    Uint16(u16),
    /// `i`
    Int32(i32),
    /// `u`
    Uint32(u32),
    /// `x`
    Int64(i64),
    /// `t`
    Uint64(u64),
    /// `d`
    Double(f64),
    /// `s`
    String(String),
    /// `o`
    ObjectPath(ObjectPath),
    /// `g`
    Signature(Signature),
    /// `a`: the element type is carried explicitly so empty arrays stay
    /// typed and re-encodable.
    Array {
        /// Element type of the array.
        elem: Type,
        /// The elements, each of type `elem`.
        items: Vec<Value>,
    },
    /// `(...)`: an ordered sequence of member values.
    Struct(Vec<Value>),
    /// `{kv}`: only meaningful as an array element.
    DictEntry(Box<Value>, Box<Value>),
    /// `v`: one dynamically typed value behind a self-describing signature.
    Variant(Box<Value>),
}

impl Value {
    /// The wire type of this value.
    #[must_use]
    pub fn wire_type(&self) -> Type {
        match self {
            Value::Byte(_) => Type::Byte,
            Value::Boolean(_) => Type::Boolean,
            Value::Int16(_) => Type::Int16,
            Value::Uint16(_) => Type::Uint16,
            Value::Int32(_) => Type::Int32,
            Value::Uint32(_) => Type::Uint32,
            Value::Int64(_) => Type::Int64,
            Value::Uint64(_) => Type::Uint64,
            Value::Double(_) => Type::Double,
            Value::String(_) => Type::String,
            Value::ObjectPath(_) => Type::ObjectPath,
            Value::Signature(_) => Type::Signature,
            Value::Array { elem, .. } => Type::Array(Box::new(elem.clone())),
            Value::Struct(members) => {
                Type::Struct(members.iter().map(Value::wire_type).collect())
            },
            Value::DictEntry(key, value) => Type::DictEntry(
                Box::new(key.wire_type()),
                Box::new(value.wire_type()),
            ),
            Value::Variant(_) => Type::Variant,
        }
    }
}

impl fmt::Display for Value {
    /// Human-readable rendering for diagnostics, one value per line in the
    /// message formatter. Strings and paths print raw; containers print in
    /// bracketed forms.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Byte(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Uint16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Uint32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Uint64(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::ObjectPath(v) => f.write_str(v.as_str()),
            Value::Signature(v) => f.write_str(v.as_str()),
            Value::Array { items, .. } => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            },
            Value::Struct(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            },
            Value::DictEntry(key, value) => write!(f, "{key}: {value}"),
            Value::Variant(inner) => write!(f, "{inner}"),
        }
    }
}

/// A self-describing container for exactly one value.
///
/// Headers map field codes to variants; the decode pipeline unwraps one
/// level of variant when surfacing body values, and the encode pipeline
/// wraps header values back up. Keeping the wrapper a distinct type makes
/// that boundary explicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant(Value);

impl Variant {
    /// Wrap a value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The wrapped value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// The wire type of the wrapped value, as the embedded signature will
    /// describe it.
    #[must_use]
    pub fn wire_type(&self) -> Type {
        self.0.wire_type()
    }
}

impl From<Value> for Variant {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_owned()))
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<u32> for Variant {
    fn from(value: u32) -> Self {
        Self(Value::Uint32(value))
    }
}

impl From<ObjectPath> for Variant {
    fn from(value: ObjectPath) -> Self {
        Self(Value::ObjectPath(value))
    }
}

impl From<Signature> for Variant {
    fn from(value: Signature) -> Self {
        Self(Value::Signature(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_types() {
        assert_eq!(Value::Uint32(7).wire_type(), Type::Uint32);
        assert_eq!(
            Value::Array { elem: Type::String, items: vec![] }.wire_type(),
            Type::Array(Box::new(Type::String)),
        );
        assert_eq!(
            Value::Struct(vec![Value::Byte(1), Value::Boolean(true)]).wire_type(),
            Type::Struct(vec![Type::Byte, Type::Boolean]),
        );
        assert_eq!(
            Value::Variant(Box::new(Value::Int64(-1))).wire_type(),
            Type::Variant,
        );
    }

    #[test]
    fn signature_for_values() {
        let values = [
            Value::String("hi".into()),
            Value::Array { elem: Type::Int32, items: vec![Value::Int32(1)] },
            Value::Struct(vec![Value::Byte(0), Value::Double(1.5)]),
        ];
        assert_eq!(Signature::for_values(&values).as_str(), "sai(yd)");
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::String("abc".into()).to_string(), "abc");
        assert_eq!(
            Value::Array {
                elem: Type::Uint32,
                items: vec![Value::Uint32(1), Value::Uint32(2)],
            }
            .to_string(),
            "[1, 2]",
        );
        assert_eq!(
            Value::Struct(vec![Value::Boolean(false), Value::Byte(9)]).to_string(),
            "(false, 9)",
        );
        assert_eq!(
            Value::Variant(Box::new(Value::Int32(-4))).to_string(),
            "-4",
        );
    }

    #[test]
    fn path_validity() {
        assert!(ObjectPath::new("/org/test").is_valid());
        assert!(!ObjectPath::new("org/test").is_valid());
    }
}
