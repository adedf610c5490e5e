//! Byte-order selection and endian-dispatched integer access.
//!
//! The first byte of every message declares the endianness of everything
//! that follows, so the byte order is a runtime value here rather than a
//! compile-time choice. All multi-byte reads and writes in the codec go
//! through this type.

use bytes::{BufMut, BytesMut};

/// Byte order of one message, fixed for the lifetime of the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Marker byte `'l'`.
    LittleEndian,
    /// Marker byte `'B'`.
    BigEndian,
}

impl ByteOrder {
    /// Select the byte order from the marker at wire offset 0.
    ///
    /// Returns `None` for anything other than `'l'` or `'B'`; the decode
    /// pipeline turns that into `invalid byte order`.
    #[must_use]
    pub const fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            b'l' => Some(Self::LittleEndian),
            b'B' => Some(Self::BigEndian),
            _ => None,
        }
    }

    /// The marker byte emitted at wire offset 0.
    #[must_use]
    pub const fn marker(self) -> u8 {
        match self {
            Self::LittleEndian => b'l',
            Self::BigEndian => b'B',
        }
    }

    /// Read a u16 from two wire bytes.
    #[must_use]
    pub const fn u16_from(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::LittleEndian => u16::from_le_bytes(bytes),
            Self::BigEndian => u16::from_be_bytes(bytes),
        }
    }

    /// Read a u32 from four wire bytes.
    #[must_use]
    pub const fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::LittleEndian => u32::from_le_bytes(bytes),
            Self::BigEndian => u32::from_be_bytes(bytes),
        }
    }

    /// Read a u64 from eight wire bytes.
    #[must_use]
    pub const fn u64_from(self, bytes: [u8; 8]) -> u64 {
        match self {
            Self::LittleEndian => u64::from_le_bytes(bytes),
            Self::BigEndian => u64::from_be_bytes(bytes),
        }
    }

    /// Append a u16 in this byte order.
    pub fn put_u16(self, buf: &mut BytesMut, value: u16) {
        match self {
            Self::LittleEndian => buf.put_u16_le(value),
            Self::BigEndian => buf.put_u16(value),
        }
    }

    /// Append a u32 in this byte order.
    pub fn put_u32(self, buf: &mut BytesMut, value: u32) {
        match self {
            Self::LittleEndian => buf.put_u32_le(value),
            Self::BigEndian => buf.put_u32(value),
        }
    }

    /// Append a u64 in this byte order.
    pub fn put_u64(self, buf: &mut BytesMut, value: u64) {
        match self {
            Self::LittleEndian => buf.put_u64_le(value),
            Self::BigEndian => buf.put_u64(value),
        }
    }

    /// The four wire bytes of a u32 in this byte order.
    #[must_use]
    pub const fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::LittleEndian => value.to_le_bytes(),
            Self::BigEndian => value.to_be_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_round_trip() {
        for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            assert_eq!(ByteOrder::from_marker(order.marker()), Some(order));
        }
    }

    #[test]
    fn reject_unknown_marker() {
        assert_eq!(ByteOrder::from_marker(b'x'), None);
        assert_eq!(ByteOrder::from_marker(0), None);
        assert_eq!(ByteOrder::from_marker(b'L'), None);
    }

    #[test]
    fn u32_endianness() {
        let le = ByteOrder::LittleEndian;
        let be = ByteOrder::BigEndian;
        assert_eq!(le.u32_from([0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
        assert_eq!(be.u32_from([0x12, 0x34, 0x56, 0x78]), 0x1234_5678);
        assert_eq!(le.u32_bytes(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(be.u32_bytes(0x1234_5678), [0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn put_matches_from() {
        for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
            let mut buf = BytesMut::new();
            order.put_u64(&mut buf, 0xDEAD_BEEF_0BAD_F00D);
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&buf);
            assert_eq!(order.u64_from(bytes), 0xDEAD_BEEF_0BAD_F00D);
        }
    }
}
