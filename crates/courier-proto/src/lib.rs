//! # Courier Protocol: D-Bus Wire Format
//!
//! This crate implements the message framing, marshaling, and validation
//! layer of the D-Bus wire protocol: it turns a byte stream from a transport
//! into a structurally and semantically valid [`Message`], and turns a
//! [`Message`] back into the exact byte layout the protocol mandates.
//!
//! ## Wire Layout
//!
//! ```text
//! offset 0   1    2     3     4..8      8..12   12..16     16..
//!       +---+----+-----+-----+---------+-------+----------+-------------+
//!       |ord|kind|flags|proto|body len |serial |hdr length|header array |
//!       +---+----+-----+-----+---------+-------+----------+-------------+
//!       | ...pad to 8 | body (body len bytes)                           |
//!       +-----------------------------------------------------------------+
//! ```
//!
//! - Byte 0 is the byte-order marker: `'l'` (little endian) or `'B'` (big
//!   endian). Every multi-byte integer and every alignment computation in the
//!   rest of the message follows it.
//! - The header array is a wire array of `(u8 field code, Variant)` structs.
//!   Each field code has exactly one legal value type, and each message kind
//!   has a set of mandatory fields; see [`HeaderField`] and
//!   [`Message::validate`].
//! - The body is a sequence of values typed by the `Signature` header.
//!
//! ## Implementation Notes
//!
//! - **Validate before parse**: the decode pipeline checks the declared
//!   header-array and body lengths against [`MAX_MESSAGE_SIZE`] before
//!   buffering either, so a hostile length field cannot drive allocation.
//!   The header grammar is validated before any body decoding is attempted.
//!
//! - **Runtime byte order**: unlike fixed-endian protocols, the byte order
//!   here is data. All integer access goes through [`ByteOrder`] rather than
//!   a compile-time endianness.
//!
//! - **Closed type universe**: wire values are a closed sum ([`Value`]), so
//!   validation is an exhaustive `match` rather than runtime type inspection,
//!   and unknown kinds or header field codes are unrepresentable once a
//!   message has been built.
//!
//! ## Scope
//!
//! This crate performs no I/O of its own beyond the caller-supplied stream,
//! never allocates serial numbers, and does not implement the bus
//! authentication handshake or any connection management. Decode and encode
//! are synchronous and all-or-nothing: a failed attempt yields a single
//! terminal error and no partial message.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decode;
pub mod encode;
pub mod errors;
pub mod flags;
pub mod header;
pub mod message;
pub mod names;
pub mod order;
pub mod signature;
pub mod value;

pub use decode::Decoder;
pub use encode::Encoder;
pub use errors::{FormatError, InvalidMessage, ProtocolError, Result};
pub use flags::MessageFlags;
pub use header::HeaderField;
pub use message::{Message, MessageKind};
pub use order::ByteOrder;
pub use signature::{Signature, Type};
pub use value::{ObjectPath, Value, Variant};

/// Protocol version emitted in every encoded message.
pub const PROTOCOL_VERSION: u8 = 1;

/// Hard ceiling on the total encoded size of one message (128 MiB).
///
/// Enforced pre-flight on decode (from the declared lengths, before any
/// buffering) and post-hoc on encode (on the assembled buffer).
pub const MAX_MESSAGE_SIZE: usize = 1 << 27;
