//! Message flags.
//!
//! The protocol defines exactly two flag bits. Unknown bits are preserved by
//! [`MessageFlags::from_byte`] so the raw wire byte survives into the
//! validator, which rejects them (`invalid flags`) rather than silently
//! masking them off.

use bitflags::bitflags;

bitflags! {
    /// Message feature flags (8 bits, two defined).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MessageFlags: u8 {
        /// The sender does not expect a method reply.
        const NO_REPLY_EXPECTED = 0b0000_0001;

        /// The bus must not launch an owner for the destination name.
        const NO_AUTO_START = 0b0000_0010;
    }
}

impl MessageFlags {
    /// Create flags from the raw wire byte.
    ///
    /// Infallible: all 256 byte values are representable. Bits outside the
    /// defined set are retained and later fail validation, which is what
    /// distinguishes this protocol from ones that ignore reserved bits.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }

    /// Convert to the raw wire byte.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self.bits()
    }
}
