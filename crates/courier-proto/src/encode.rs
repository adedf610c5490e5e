//! Value marshaller (wire write side).
//!
//! [`Encoder`] appends alignment-correct wire representations of values to a
//! growing buffer. Offsets are relative to the start of the buffer, which
//! the message pipeline arranges to coincide with the start of the message
//! (the body is encoded in its own buffer, whose origin is 8-byte aligned in
//! the final layout, so every alignment the codec needs holds there too).
//!
//! Array byte lengths are back-patched after the elements are written,
//! keeping the codec single-pass.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    errors::FormatError,
    order::ByteOrder,
    signature::{MAX_SIGNATURE_LEN, Signature},
    value::{Value, Variant},
};

/// Alignment-aware encoder for one message's worth of wire data.
#[derive(Debug)]
pub struct Encoder {
    buf: BytesMut,
    order: ByteOrder,
}

impl Encoder {
    /// Create an encoder writing in the given byte order.
    #[must_use]
    pub fn new(order: ByteOrder) -> Self {
        Self { buf: BytesMut::new(), order }
    }

    /// Byte order this encoder writes in.
    #[must_use]
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Current write position, relative to the buffer origin.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Pad with zero bytes to the next multiple of `boundary`.
    pub fn align(&mut self, boundary: usize) {
        while self.buf.len() % boundary != 0 {
            self.buf.put_u8(0);
        }
    }

    /// Append one raw byte, no alignment.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// Append a u32 at 4-byte alignment.
    pub fn put_u32(&mut self, value: u32) {
        self.align(4);
        self.order.put_u32(&mut self.buf, value);
    }

    /// Append raw bytes, no alignment.
    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Append one value in its wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::SignatureTooLong`] for a variant whose
    /// contents cannot be described in 255 signature bytes, and
    /// [`FormatError::ArrayTooLong`] for an array whose element data
    /// exceeds the u32 length field.
    pub fn encode_value(&mut self, value: &Value) -> Result<(), FormatError> {
        match value {
            Value::Byte(v) => self.buf.put_u8(*v),
            Value::Boolean(v) => self.put_u32(u32::from(*v)),
            Value::Int16(v) => {
                self.align(2);
                self.order.put_u16(&mut self.buf, *v as u16);
            },
            Value::Uint16(v) => {
                self.align(2);
                self.order.put_u16(&mut self.buf, *v);
            },
            Value::Int32(v) => self.put_u32(*v as u32),
            Value::Uint32(v) => self.put_u32(*v),
            Value::Int64(v) => {
                self.align(8);
                self.order.put_u64(&mut self.buf, *v as u64);
            },
            Value::Uint64(v) => {
                self.align(8);
                self.order.put_u64(&mut self.buf, *v);
            },
            Value::Double(v) => {
                self.align(8);
                self.order.put_u64(&mut self.buf, v.to_bits());
            },
            Value::String(v) => self.put_string(v),
            Value::ObjectPath(v) => self.put_string(v.as_str()),
            Value::Signature(v) => self.put_signature(v.as_str())?,
            Value::Array { elem, items } => {
                self.put_u32(0); // length, patched once the data is written
                let length_at = self.buf.len() - 4;
                self.align(elem.alignment());
                let data_start = self.buf.len();
                for item in items {
                    self.encode_value(item)?;
                }
                let data_len = u32::try_from(self.buf.len() - data_start)
                    .map_err(|_| FormatError::ArrayTooLong)?;
                self.buf[length_at..length_at + 4]
                    .copy_from_slice(&self.order.u32_bytes(data_len));
            },
            Value::Struct(members) => {
                self.align(8);
                for member in members {
                    self.encode_value(member)?;
                }
            },
            Value::DictEntry(key, entry_value) => {
                self.align(8);
                self.encode_value(key)?;
                self.encode_value(entry_value)?;
            },
            Value::Variant(inner) => {
                let signature = Signature::of(&[inner.wire_type()]);
                self.put_signature(signature.as_str())?;
                self.encode_value(inner)?;
            },
        }
        Ok(())
    }

    /// Append a variant: its embedded one-type signature, then the value.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Encoder::encode_value`].
    pub fn encode_variant(&mut self, variant: &Variant) -> Result<(), FormatError> {
        let signature = Signature::of(&[variant.wire_type()]);
        self.put_signature(signature.as_str())?;
        self.encode_value(variant.value())
    }

    /// Consume the encoder, yielding the wire bytes.
    #[must_use]
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Aligned u32 byte length, bytes, NUL.
    fn put_string(&mut self, text: &str) {
        self.put_u32(text.len() as u32);
        self.buf.put_slice(text.as_bytes());
        self.buf.put_u8(0);
    }

    /// u8 byte length, bytes, NUL. Signatures align to 1.
    fn put_signature(&mut self, text: &str) -> Result<(), FormatError> {
        if text.len() > MAX_SIGNATURE_LEN {
            return Err(FormatError::SignatureTooLong);
        }
        self.buf.put_u8(text.len() as u8);
        self.buf.put_slice(text.as_bytes());
        self.buf.put_u8(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Type;

    fn encode(order: ByteOrder, value: &Value) -> Vec<u8> {
        let mut enc = Encoder::new(order);
        enc.encode_value(value).expect("should encode");
        enc.finish().to_vec()
    }

    #[test]
    fn string_layout() {
        let wire = encode(ByteOrder::LittleEndian, &Value::String("hi".into()));
        assert_eq!(wire, [2, 0, 0, 0, b'h', b'i', 0]);
    }

    #[test]
    fn big_endian_integers() {
        let wire = encode(ByteOrder::BigEndian, &Value::Uint32(0x0102_0304));
        assert_eq!(wire, [1, 2, 3, 4]);
    }

    #[test]
    fn alignment_padding_before_u32() {
        let mut enc = Encoder::new(ByteOrder::LittleEndian);
        enc.encode_value(&Value::Byte(0xAA)).unwrap();
        enc.encode_value(&Value::Uint32(1)).unwrap();
        assert_eq!(enc.finish().to_vec(), [0xAA, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn array_length_excludes_element_padding() {
        // Array of u64: length word at 0, pad to 8, one element.
        let wire = encode(
            ByteOrder::LittleEndian,
            &Value::Array { elem: Type::Uint64, items: vec![Value::Uint64(5)] },
        );
        assert_eq!(wire.len(), 4 + 4 + 8);
        assert_eq!(&wire[..4], [8, 0, 0, 0]);
        assert_eq!(&wire[4..8], [0, 0, 0, 0]);
        assert_eq!(&wire[8..], [5, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn empty_array_keeps_element_padding() {
        let wire = encode(
            ByteOrder::LittleEndian,
            &Value::Array { elem: Type::Uint64, items: vec![] },
        );
        assert_eq!(wire, [0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn variant_embeds_signature() {
        let wire = encode(
            ByteOrder::LittleEndian,
            &Value::Variant(Box::new(Value::Byte(7))),
        );
        assert_eq!(wire, [1, b'y', 0, 7]);
    }

    #[test]
    fn boolean_is_a_u32() {
        let wire = encode(ByteOrder::BigEndian, &Value::Boolean(true));
        assert_eq!(wire, [0, 0, 0, 1]);
    }
}
