//! Value unmarshaller (wire read side).
//!
//! [`Decoder`] walks a byte slice with an absolute-offset cursor, so
//! alignment is computed relative to the start of the *message* even when
//! the slice in hand starts mid-message ([`Decoder::new_at`]). Decoding is
//! type-directed: the caller supplies the expected [`Type`] (from a
//! signature) and gets back a [`Value`] or a [`FormatError`].
//!
//! Every read is bounds-checked before any allocation, so a hostile length
//! field inside a value fails with `UnexpectedEof` instead of driving a
//! large allocation.

use crate::{
    errors::FormatError,
    order::ByteOrder,
    signature::{Signature, Type},
    value::{ObjectPath, Value, Variant},
};

/// Alignment-aware, bounds-checked decoder over one slice of wire data.
#[derive(Debug)]
pub struct Decoder<'a> {
    data: &'a [u8],
    order: ByteOrder,
    /// Absolute wire offset of `data[0]`, for alignment bookkeeping.
    base: usize,
    cursor: usize,
}

impl<'a> Decoder<'a> {
    /// Decode from a slice whose first byte sits at wire offset 0.
    #[must_use]
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self::new_at(data, order, 0)
    }

    /// Decode from a slice whose first byte sits at wire offset `base`.
    ///
    /// The message pipeline uses this to decode the header array with
    /// offsets relative to the whole-message origin.
    #[must_use]
    pub fn new_at(data: &'a [u8], order: ByteOrder, base: usize) -> Self {
        Self { data, order, base, cursor: 0 }
    }

    /// Absolute wire offset of the next byte to be read.
    #[must_use]
    pub fn position(&self) -> usize {
        self.base + self.cursor
    }

    /// Bytes left in the slice.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Skip padding up to the next multiple of `boundary`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnexpectedEof`] if the padding runs off the
    /// end of the data.
    pub fn align(&mut self, boundary: usize) -> Result<(), FormatError> {
        let padding = (boundary - self.position() % boundary) % boundary;
        self.take(padding)?;
        Ok(())
    }

    /// Decode one value of the given type.
    ///
    /// # Errors
    ///
    /// Any [`FormatError`]: truncation, bad boolean, bad UTF-8, missing
    /// NUL, malformed embedded signature, or an array length that does not
    /// land on an element boundary.
    pub fn decode_value(&mut self, ty: &Type) -> Result<Value, FormatError> {
        let value = match ty {
            Type::Byte => Value::Byte(self.get_u8()?),
            Type::Boolean => match self.get_u32()? {
                0 => Value::Boolean(false),
                1 => Value::Boolean(true),
                other => return Err(FormatError::InvalidBool(other)),
            },
            Type::Int16 => Value::Int16(self.get_u16()? as i16),
            Type::Uint16 => Value::Uint16(self.get_u16()?),
            Type::Int32 => Value::Int32(self.get_u32()? as i32),
            Type::Uint32 => Value::Uint32(self.get_u32()?),
            Type::Int64 => Value::Int64(self.get_u64()? as i64),
            Type::Uint64 => Value::Uint64(self.get_u64()?),
            Type::Double => Value::Double(f64::from_bits(self.get_u64()?)),
            Type::String => Value::String(self.get_string()?),
            Type::ObjectPath => Value::ObjectPath(ObjectPath::new(self.get_string()?)),
            Type::Signature => Value::Signature(self.get_signature()?),
            Type::Array(elem) => {
                let byte_len = self.get_u32()? as usize;
                self.align(elem.alignment())?;
                if byte_len > self.remaining() {
                    return Err(FormatError::UnexpectedEof);
                }
                let end = self.position() + byte_len;
                let mut items = Vec::new();
                while self.position() < end {
                    items.push(self.decode_value(elem)?);
                }
                if self.position() != end {
                    return Err(FormatError::ArrayLength);
                }
                Value::Array { elem: (**elem).clone(), items }
            },
            Type::Struct(members) => {
                self.align(8)?;
                let mut values = Vec::with_capacity(members.len());
                for member in members {
                    values.push(self.decode_value(member)?);
                }
                Value::Struct(values)
            },
            Type::DictEntry(key, entry_value) => {
                self.align(8)?;
                let key = self.decode_value(key)?;
                let entry_value = self.decode_value(entry_value)?;
                Value::DictEntry(Box::new(key), Box::new(entry_value))
            },
            Type::Variant => {
                let variant = self.decode_variant()?;
                Value::Variant(Box::new(variant.into_value()))
            },
        };
        Ok(value)
    }

    /// Decode a variant: its embedded signature, then the one value the
    /// signature describes.
    ///
    /// # Errors
    ///
    /// [`FormatError::VariantSignature`] if the embedded signature does not
    /// hold exactly one complete type, plus any value decode failure.
    pub fn decode_variant(&mut self) -> Result<Variant, FormatError> {
        let signature = self.get_signature()?;
        let [ty] = signature.types() else {
            return Err(FormatError::VariantSignature);
        };
        let ty = ty.clone();
        Ok(Variant::new(self.decode_value(&ty)?))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        if len > self.remaining() {
            return Err(FormatError::UnexpectedEof);
        }
        let bytes = &self.data[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(bytes)
    }

    fn get_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    fn get_u16(&mut self) -> Result<u16, FormatError> {
        self.align(2)?;
        let bytes = self.take(2)?;
        Ok(self.order.u16_from([bytes[0], bytes[1]]))
    }

    fn get_u32(&mut self) -> Result<u32, FormatError> {
        self.align(4)?;
        let bytes = self.take(4)?;
        Ok(self.order.u32_from([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn get_u64(&mut self) -> Result<u64, FormatError> {
        self.align(8)?;
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(self.order.u64_from(raw))
    }

    /// Aligned u32 length, bytes, NUL; UTF-8 checked.
    fn get_string(&mut self) -> Result<String, FormatError> {
        let len = self.get_u32()? as usize;
        let bytes = self.take(len)?;
        if self.take(1)?[0] != 0 {
            return Err(FormatError::MissingNul);
        }
        String::from_utf8(bytes.to_vec()).map_err(|_| FormatError::InvalidUtf8)
    }

    /// u8 length, bytes, NUL; parsed under the signature grammar.
    fn get_signature(&mut self) -> Result<Signature, FormatError> {
        let len = self.get_u8()? as usize;
        let bytes = self.take(len)?;
        if self.take(1)?[0] != 0 {
            return Err(FormatError::MissingNul);
        }
        let text = std::str::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8)?;
        Signature::parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::Encoder;

    fn round_trip(order: ByteOrder, value: &Value) -> Value {
        let mut enc = Encoder::new(order);
        enc.encode_value(value).expect("should encode");
        let wire = enc.finish();
        let mut dec = Decoder::new(&wire, order);
        let decoded = dec.decode_value(&value.wire_type()).expect("should decode");
        assert_eq!(dec.remaining(), 0, "decode must consume the encoding exactly");
        decoded
    }

    #[test]
    fn scalar_round_trips() {
        use crate::signature::Type;

        let values = [
            Value::Byte(0xFF),
            Value::Boolean(true),
            Value::Int16(-2),
            Value::Uint16(0xBEEF),
            Value::Int32(i32::MIN),
            Value::Uint32(u32::MAX),
            Value::Int64(-1),
            Value::Uint64(u64::MAX),
            Value::Double(6.5),
            Value::String("hello world".into()),
            Value::ObjectPath(ObjectPath::new("/org/test")),
            Value::Signature(Signature::parse("a{sv}").unwrap()),
            Value::Array {
                elem: Type::Int16,
                items: vec![Value::Int16(1), Value::Int16(2), Value::Int16(3)],
            },
            Value::Struct(vec![Value::Byte(1), Value::Uint64(2), Value::String("x".into())]),
            Value::Variant(Box::new(Value::Double(0.25))),
        ];
        for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            for value in &values {
                assert_eq!(&round_trip(order, value), value);
            }
        }
    }

    #[test]
    fn dict_array_round_trip() {
        use crate::signature::Type;

        let dict = Value::Array {
            elem: Type::DictEntry(Box::new(Type::String), Box::new(Type::Variant)),
            items: vec![
                Value::DictEntry(
                    Box::new(Value::String("answer".into())),
                    Box::new(Value::Variant(Box::new(Value::Uint32(42)))),
                ),
                Value::DictEntry(
                    Box::new(Value::String("name".into())),
                    Box::new(Value::Variant(Box::new(Value::String("courier".into())))),
                ),
            ],
        };
        assert_eq!(round_trip(ByteOrder::LittleEndian, &dict), dict);
    }

    #[test]
    fn base_offset_drives_alignment() {
        // A u32 decoded at wire offset 6 must skip two padding bytes.
        let data = [0u8, 0, 7, 0, 0, 0];
        let mut dec = Decoder::new_at(&data, ByteOrder::LittleEndian, 6);
        let value = dec.decode_value(&crate::signature::Type::Uint32).unwrap();
        assert_eq!(value, Value::Uint32(7));
    }

    #[test]
    fn reject_bad_boolean() {
        let data = [2u8, 0, 0, 0];
        let mut dec = Decoder::new(&data, ByteOrder::LittleEndian);
        assert_eq!(
            dec.decode_value(&crate::signature::Type::Boolean),
            Err(FormatError::InvalidBool(2)),
        );
    }

    #[test]
    fn reject_truncated_string() {
        // Claims 100 bytes, provides 2. Must fail before allocating 100.
        let data = [100u8, 0, 0, 0, b'h', b'i'];
        let mut dec = Decoder::new(&data, ByteOrder::LittleEndian);
        assert_eq!(
            dec.decode_value(&crate::signature::Type::String),
            Err(FormatError::UnexpectedEof),
        );
    }

    #[test]
    fn reject_string_without_nul() {
        let data = [2u8, 0, 0, 0, b'h', b'i', 1];
        let mut dec = Decoder::new(&data, ByteOrder::LittleEndian);
        assert_eq!(
            dec.decode_value(&crate::signature::Type::String),
            Err(FormatError::MissingNul),
        );
    }

    #[test]
    fn reject_array_length_off_boundary() {
        // Array of u32 claiming 6 data bytes: not a whole number of elements.
        let data = [6u8, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0];
        let mut dec = Decoder::new(&data, ByteOrder::LittleEndian);
        let ty = crate::signature::Type::Array(Box::new(crate::signature::Type::Uint32));
        assert_eq!(dec.decode_value(&ty), Err(FormatError::ArrayLength));
    }

    #[test]
    fn reject_variant_with_multi_type_signature() {
        let data = [2u8, b'y', b'y', 0, 1, 2];
        let mut dec = Decoder::new(&data, ByteOrder::LittleEndian);
        assert_eq!(dec.decode_variant(), Err(FormatError::VariantSignature));
    }
}
