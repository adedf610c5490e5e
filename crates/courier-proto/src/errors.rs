//! Error types for the Courier wire format.
//!
//! Three terminal classes, mirroring the three ways a decode or encode
//! attempt can die: the message violates the protocol grammar
//! ([`InvalidMessage`]), the bytes cannot be interpreted as the expected wire
//! types ([`FormatError`]), or the underlying stream failed (`Io`). None are
//! retried or recovered internally; resynchronization policy belongs to the
//! transport layer.

use thiserror::Error;

/// Convenient Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Any error a decode or encode attempt can return.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The message violates the protocol's structural grammar.
    #[error("invalid message: {0}")]
    Invalid(#[from] InvalidMessage),

    /// The wire bytes cannot be interpreted as the expected types.
    #[error("malformed wire data: {0}")]
    Format(#[from] FormatError),

    /// Stream I/O failure, propagated unchanged from the underlying reader
    /// or writer.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A structural or semantic violation of the message grammar.
///
/// Returned by [`Message::validate`](crate::Message::validate) (first
/// violation wins) and by the pipelines for framing violations: a bad
/// byte-order marker or an oversize message. Always fatal to the current
/// attempt.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMessage {
    /// Byte 0 is neither `'l'` nor `'B'`.
    #[error("invalid byte order")]
    ByteOrder,

    /// Declared or assembled size exceeds
    /// [`MAX_MESSAGE_SIZE`](crate::MAX_MESSAGE_SIZE).
    #[error("message is too long")]
    TooLong,

    /// A flag bit outside the two defined bits is set.
    #[error("invalid flags")]
    Flags,

    /// The message kind is zero or beyond the four defined kinds.
    #[error("invalid message type")]
    Kind,

    /// A header field code is zero or beyond the defined codes.
    #[error("invalid header")]
    Field,

    /// A header value's wire type does not match its field code's schema.
    #[error("invalid type of header field")]
    FieldType,

    /// A field required for this message kind is absent.
    #[error("missing required header")]
    MissingField,

    /// The Path header does not satisfy object-path syntax.
    #[error("invalid path name")]
    Path,

    /// The Interface header does not satisfy interface-name syntax.
    #[error("invalid interface name")]
    Interface,

    /// The Member header does not satisfy member-name syntax.
    #[error("invalid member name")]
    Member,

    /// The ErrorName header does not satisfy interface-name syntax.
    #[error("invalid error name")]
    ErrorName,

    /// The body is non-empty but no Signature header describes it.
    #[error("missing signature")]
    MissingSignature,
}

/// A wire encoding the value codec cannot interpret or produce.
///
/// Fatal to the current decode attempt; the encode-side variants guard the
/// few places where a constructed value has no legal wire representation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The data ended before the expected value did.
    #[error("unexpected end of message data")]
    UnexpectedEof,

    /// A boolean was encoded as something other than 0 or 1.
    #[error("boolean must be 0 or 1, got {0}")]
    InvalidBool(u32),

    /// A string's bytes are not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// A string or signature is missing its NUL terminator.
    #[error("missing NUL terminator")]
    MissingNul,

    /// A type signature does not parse under the signature grammar.
    #[error("malformed type signature {0:?}")]
    InvalidSignature(String),

    /// Array or struct nesting exceeds the protocol's depth limit.
    #[error("container nesting exceeds depth limit")]
    DepthLimit,

    /// An array's declared byte length does not land on an element boundary.
    #[error("array length does not match its contents")]
    ArrayLength,

    /// A variant's embedded signature holds zero or several complete types.
    #[error("variant signature must contain exactly one complete type")]
    VariantSignature,

    /// An array's element data cannot be described by a u32 byte length.
    #[error("array too long to encode")]
    ArrayTooLong,

    /// A signature string exceeds the 255-byte wire limit.
    #[error("type signature exceeds 255 bytes")]
    SignatureTooLong,
}
