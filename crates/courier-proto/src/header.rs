//! Header field codes and the field schema.
//!
//! Every header entry on the wire is a `(field code, Variant)` pair. The
//! protocol assigns each code exactly one legal value type; that schema is
//! the source of truth for the validator's per-field type check.

use crate::signature::Type;

/// Header field codes.
///
/// The codes are small dense integers starting at 1. Keeping them a closed
/// `#[repr(u8)]` enum means a constructed message cannot hold an undefined
/// code at all; wire input with an unknown code is rejected during decode
/// with the validator's `invalid header` reason.
///
/// `Ord` follows the wire code, which is what makes the header map's
/// iteration (and therefore the encoder's field order) deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum HeaderField {
    /// Object path a call is addressed to, or a signal is emitted from.
    Path = 1,
    /// Interface the member belongs to.
    Interface = 2,
    /// Method or signal name.
    Member = 3,
    /// Name of the error an error message reports.
    ErrorName = 4,
    /// Serial of the message this one replies to.
    ReplySerial = 5,
    /// Connection name of the intended recipient.
    Destination = 6,
    /// Connection name of the sender, filled in by the bus.
    Sender = 7,
    /// Type signature of the message body.
    Signature = 8,
    /// Number of Unix file descriptors accompanying the message.
    UnixFds = 9,
}

impl HeaderField {
    /// Convert from the raw wire code.
    ///
    /// Returns `None` for zero and anything past the defined codes.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Path),
            2 => Some(Self::Interface),
            3 => Some(Self::Member),
            4 => Some(Self::ErrorName),
            5 => Some(Self::ReplySerial),
            6 => Some(Self::Destination),
            7 => Some(Self::Sender),
            8 => Some(Self::Signature),
            9 => Some(Self::UnixFds),
            _ => None,
        }
    }

    /// Convert to the raw wire code.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// The single wire type a value for this field must have.
    #[must_use]
    pub fn value_type(self) -> Type {
        match self {
            Self::Path => Type::ObjectPath,
            Self::Interface
            | Self::Member
            | Self::ErrorName
            | Self::Destination
            | Self::Sender => Type::String,
            Self::ReplySerial | Self::UnixFds => Type::Uint32,
            Self::Signature => Type::Signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        for code in 1..=9u8 {
            let field = HeaderField::from_u8(code).expect("defined code");
            assert_eq!(field.to_u8(), code);
        }
    }

    #[test]
    fn reject_undefined_codes() {
        assert_eq!(HeaderField::from_u8(0), None);
        assert_eq!(HeaderField::from_u8(10), None);
        assert_eq!(HeaderField::from_u8(0xFF), None);
    }

    #[test]
    fn field_schema() {
        assert_eq!(HeaderField::Path.value_type(), Type::ObjectPath);
        assert_eq!(HeaderField::Interface.value_type(), Type::String);
        assert_eq!(HeaderField::Member.value_type(), Type::String);
        assert_eq!(HeaderField::ErrorName.value_type(), Type::String);
        assert_eq!(HeaderField::ReplySerial.value_type(), Type::Uint32);
        assert_eq!(HeaderField::Destination.value_type(), Type::String);
        assert_eq!(HeaderField::Sender.value_type(), Type::String);
        assert_eq!(HeaderField::Signature.value_type(), Type::Signature);
        assert_eq!(HeaderField::UnixFds.value_type(), Type::Uint32);
    }
}
