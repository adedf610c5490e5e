//! The message entity and its pipelines.
//!
//! A [`Message`] is one complete unit of the protocol: byte order, kind,
//! flags, header fields, body, and the transport-assigned serial. Messages
//! are built either by [`Message::decode`] from a byte stream or directly by
//! a connection layer; both pipelines share the pure [`Message::validate`]
//! grammar check, which runs before a body is decoded and before any bytes
//! are written.
//!
//! Decode is all-or-nothing: a failed attempt returns a single terminal
//! error and never a partial message. Encode assembles the entire wire image
//! in memory, bounds it, and hands it to the writer in one operation; there
//! is no resynchronization marker in this protocol, so a failed write leaves
//! the stream unusable for further messages.

use std::{collections::BTreeMap, fmt, io};

use bytes::Bytes;

use crate::{
    MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
    decode::Decoder,
    encode::Encoder,
    errors::{InvalidMessage, Result},
    flags::MessageFlags,
    header::HeaderField,
    names,
    order::ByteOrder,
    signature::Type,
    value::{Value, Variant},
};

/// Wire offset of the header array's length word.
const HEADER_ARRAY_OFFSET: usize = 12;

/// Fixed framing overhead: the 12-byte fixed header plus the header-array
/// length word. Used by the pre-flight size bound.
const FIXED_OVERHEAD: usize = 16;

/// The four message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    /// A method invocation on a remote object.
    MethodCall = 1,
    /// The successful reply to a method call.
    MethodReply = 2,
    /// The failure reply to a method call.
    Error = 3,
    /// A broadcast notification.
    Signal = 4,
}

impl MessageKind {
    /// Convert from the raw wire byte.
    ///
    /// Returns `None` for zero and anything past the defined kinds; the
    /// decode pipeline turns that into `invalid message type`.
    #[must_use]
    pub const fn from_u8(kind: u8) -> Option<Self> {
        match kind {
            1 => Some(Self::MethodCall),
            2 => Some(Self::MethodReply),
            3 => Some(Self::Error),
            4 => Some(Self::Signal),
            _ => None,
        }
    }

    /// Convert to the raw wire byte.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// The header fields a message of this kind must carry.
    #[must_use]
    pub const fn required_fields(self) -> &'static [HeaderField] {
        match self {
            Self::MethodCall => &[HeaderField::Path, HeaderField::Member],
            Self::MethodReply => &[HeaderField::ReplySerial],
            Self::Error => &[HeaderField::ErrorName, HeaderField::ReplySerial],
            Self::Signal => {
                &[HeaderField::Path, HeaderField::Interface, HeaderField::Member]
            },
        }
    }

    /// Human-readable kind label used by the diagnostic formatter.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MethodCall => "method call",
            Self::MethodReply => "reply",
            Self::Error => "error",
            Self::Signal => "signal",
        }
    }
}

/// One protocol message.
///
/// Construction cannot express an undefined byte order, kind, or header
/// field code (those are closed enums); everything else the grammar
/// requires (flag bits, per-field value types, required fields, name
/// syntax, body/signature coupling) is checked by [`Message::validate`].
///
/// `serial` is opaque here: the transport layer assigns it on outgoing
/// messages and this crate carries it verbatim in both directions.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Byte order of every multi-byte quantity in this message.
    pub order: ByteOrder,
    /// Message kind.
    pub kind: MessageKind,
    /// Flag bits.
    pub flags: MessageFlags,
    /// Header fields; duplicate codes cannot exist, and encode order is
    /// ascending field code.
    pub headers: BTreeMap<HeaderField, Variant>,
    /// Top-level body values, typed by the `Signature` header.
    pub body: Vec<Value>,
    /// Transport-assigned message serial.
    pub serial: u32,
}

impl Message {
    /// An empty little-endian message of the given kind.
    ///
    /// The result is not yet valid for most kinds; callers add the required
    /// header fields before encoding.
    #[must_use]
    pub fn new(kind: MessageKind) -> Self {
        Self {
            order: ByteOrder::LittleEndian,
            kind,
            flags: MessageFlags::empty(),
            headers: BTreeMap::new(),
            body: Vec::new(),
            serial: 0,
        }
    }

    /// The value of a header field, unwrapped from its variant.
    #[must_use]
    pub fn header(&self, field: HeaderField) -> Option<&Value> {
        self.headers.get(&field).map(Variant::value)
    }

    /// Check every structural invariant, returning the first violation.
    ///
    /// Pure and I/O-free; both pipelines call this, and a connection layer
    /// can call it to pre-validate a message before attempting to send it.
    ///
    /// # Errors
    ///
    /// The violated invariant, whose `Display` is the protocol's reason
    /// string.
    pub fn validate(&self) -> std::result::Result<(), InvalidMessage> {
        if !MessageFlags::all().contains(self.flags) {
            return Err(InvalidMessage::Flags);
        }
        for (field, variant) in &self.headers {
            if variant.wire_type() != field.value_type() {
                return Err(InvalidMessage::FieldType);
            }
        }
        for field in self.kind.required_fields() {
            if !self.headers.contains_key(field) {
                return Err(InvalidMessage::MissingField);
            }
        }
        if let Some(Value::ObjectPath(path)) = self.header(HeaderField::Path) {
            if !path.is_valid() {
                return Err(InvalidMessage::Path);
            }
        }
        if let Some(Value::String(name)) = self.header(HeaderField::Interface) {
            if !names::is_valid_interface_name(name) {
                return Err(InvalidMessage::Interface);
            }
        }
        if let Some(Value::String(name)) = self.header(HeaderField::Member) {
            if !names::is_valid_member_name(name) {
                return Err(InvalidMessage::Member);
            }
        }
        // Error names reuse the interface grammar.
        if let Some(Value::String(name)) = self.header(HeaderField::ErrorName) {
            if !names::is_valid_interface_name(name) {
                return Err(InvalidMessage::ErrorName);
            }
        }
        if !self.body.is_empty() && !self.headers.contains_key(&HeaderField::Signature) {
            return Err(InvalidMessage::MissingSignature);
        }
        Ok(())
    }

    /// Decode one message from a byte stream.
    ///
    /// Reads exactly one message's worth of bytes in strict wire order:
    /// marker, fixed header, header-array length, header array, body
    /// padding, body. The declared lengths are bounded against
    /// [`MAX_MESSAGE_SIZE`] before the header array or body is buffered,
    /// and the header grammar is validated before the body is decoded.
    ///
    /// # Errors
    ///
    /// [`InvalidMessage`](crate::ProtocolError::Invalid) for grammar and
    /// framing violations, [`Format`](crate::ProtocolError::Format) for
    /// uninterpretable wire bytes, [`Io`](crate::ProtocolError::Io) for
    /// stream failures. All are terminal; resynchronization (typically a
    /// reconnect) is the caller's policy.
    pub fn decode<R: io::Read>(reader: &mut R) -> Result<Self> {
        let mut marker = [0u8; 1];
        reader.read_exact(&mut marker)?;
        let order = ByteOrder::from_marker(marker[0]).ok_or(InvalidMessage::ByteOrder)?;

        // Fixed header, offsets 1..12: kind, flags, protocol version, body
        // length, serial. The version byte is carried but not enforced.
        let mut fixed = [0u8; 11];
        reader.read_exact(&mut fixed)?;
        let kind = MessageKind::from_u8(fixed[0]).ok_or(InvalidMessage::Kind)?;
        let flags = MessageFlags::from_byte(fixed[1]);
        let body_len = order.u32_from([fixed[3], fixed[4], fixed[5], fixed[6]]) as usize;
        let serial = order.u32_from([fixed[7], fixed[8], fixed[9], fixed[10]]);

        // The header-array length is read raw, up front: the size bound
        // must hold before anything further is buffered.
        let mut header_len_raw = [0u8; 4];
        reader.read_exact(&mut header_len_raw)?;
        let header_len = order.u32_from(header_len_raw) as usize;
        if header_len as u64 + body_len as u64 + FIXED_OVERHEAD as u64
            > MAX_MESSAGE_SIZE as u64
        {
            return Err(InvalidMessage::TooLong.into());
        }

        // Prepend the length bytes back so the codec re-derives the
        // array's own length prefix, positioned at wire offset 12.
        let mut header_wire = vec![0u8; 4 + header_len];
        header_wire[..4].copy_from_slice(&header_len_raw);
        reader.read_exact(&mut header_wire[4..])?;

        let mut dec = Decoder::new_at(&header_wire, order, HEADER_ARRAY_OFFSET);
        let Value::Array { items, .. } = dec.decode_value(&header_array_type())? else {
            unreachable!("header array decodes as an array");
        };
        let mut headers = BTreeMap::new();
        for item in items {
            let (code, variant) = header_pair(item);
            let field = HeaderField::from_u8(code).ok_or(InvalidMessage::Field)?;
            // Duplicate field codes: last occurrence wins, silently.
            headers.insert(field, variant);
        }

        // The body starts 8-aligned relative to the message origin; the
        // padding is on the wire even when the body is empty.
        let padding = (8 - (FIXED_OVERHEAD + header_len) % 8) % 8;
        let mut pad = [0u8; 7];
        reader.read_exact(&mut pad[..padding])?;

        let mut body_wire = vec![0u8; body_len];
        reader.read_exact(&mut body_wire)?;

        // Validate the header grammar before any body decoding.
        let mut message = Message { order, kind, flags, headers, body: Vec::new(), serial };
        message.validate()?;

        let signature = match message.header(HeaderField::Signature) {
            Some(Value::Signature(signature)) if !signature.is_empty() => {
                Some(signature.clone())
            },
            _ => None,
        };
        if let Some(signature) = signature {
            let mut dec = Decoder::new(&body_wire, order);
            let mut body = Vec::with_capacity(signature.types().len());
            for ty in signature.types() {
                body.push(dec.decode_value(ty)?);
            }
            message.body = body;
        } else if body_len != 0 {
            // A body with no signature to describe it is unreadable.
            return Err(InvalidMessage::MissingSignature.into());
        }

        Ok(message)
    }

    /// Encode this message into its exact wire byte layout.
    ///
    /// Validates first and performs no work on an invalid message. The
    /// body is encoded ahead of the framing because the fixed header
    /// carries its byte length.
    ///
    /// # Errors
    ///
    /// [`InvalidMessage`](crate::ProtocolError::Invalid) from validation or
    /// the post-hoc size bound, [`Format`](crate::ProtocolError::Format) if
    /// a value has no legal wire representation.
    pub fn encode(&self) -> Result<Bytes> {
        self.validate()?;

        let mut body_enc = Encoder::new(self.order);
        for value in &self.body {
            body_enc.encode_value(value)?;
        }
        let body = body_enc.finish();

        let mut enc = Encoder::new(self.order);
        enc.put_u8(self.order.marker());
        enc.put_u8(self.kind.to_u8());
        enc.put_u8(self.flags.to_byte());
        enc.put_u8(PROTOCOL_VERSION);
        enc.put_u32(body.len() as u32);
        enc.put_u32(self.serial);

        let entries: Vec<Value> = self
            .headers
            .iter()
            .map(|(field, variant)| {
                Value::Struct(vec![
                    Value::Byte(field.to_u8()),
                    Value::Variant(Box::new(variant.value().clone())),
                ])
            })
            .collect();
        enc.encode_value(&Value::Array { elem: header_entry_type(), items: entries })?;

        enc.align(8);
        enc.put_slice(&body);

        let wire = enc.finish();
        if wire.len() > MAX_MESSAGE_SIZE {
            return Err(InvalidMessage::TooLong.into());
        }
        Ok(wire)
    }

    /// Encode and write this message to a stream in a single operation.
    ///
    /// # Errors
    ///
    /// Everything [`Message::encode`] returns, plus the underlying I/O
    /// error on a failed or partial write. A failed write leaves the
    /// stream position undefined; the caller must not retry on the same
    /// stream.
    pub fn encode_to<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let wire = self.encode()?;
        writer.write_all(&wire)?;
        Ok(())
    }
}

impl fmt::Display for Message {
    /// One-line summary plus one indented line per body value, in the
    /// manner of a bus monitor. Renders `<invalid>` for a message that
    /// fails validation rather than erroring.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.validate().is_err() {
            return f.write_str("<invalid>");
        }
        f.write_str(self.kind.label())?;
        if let Some(Value::String(sender)) = self.header(HeaderField::Sender) {
            write!(f, " from {sender}")?;
        }
        match self.header(HeaderField::Destination) {
            Some(Value::String(destination)) => write!(f, " to {destination}")?,
            _ => f.write_str(" to <null>")?,
        }
        write!(f, " serial {}", self.serial)?;
        if let Some(Value::Uint32(count)) = self.header(HeaderField::UnixFds) {
            write!(f, " unixfds {count}")?;
        }
        if let Some(Value::ObjectPath(path)) = self.header(HeaderField::Path) {
            write!(f, " path {path}")?;
        }
        if let Some(Value::String(interface)) = self.header(HeaderField::Interface) {
            write!(f, " interface {interface}")?;
        }
        if let Some(Value::String(name)) = self.header(HeaderField::ErrorName) {
            write!(f, " name {name}")?;
        }
        if let Some(Value::String(member)) = self.header(HeaderField::Member) {
            write!(f, " member {member}")?;
        }
        for value in &self.body {
            write!(f, "\n  {value}")?;
        }
        Ok(())
    }
}

/// Element type of the header array: `(u8 field code, Variant)`.
fn header_entry_type() -> Type {
    Type::Struct(vec![Type::Byte, Type::Variant])
}

fn header_array_type() -> Type {
    Type::Array(Box::new(header_entry_type()))
}

/// Split a decoded header entry into its field code and variant.
fn header_pair(item: Value) -> (u8, Variant) {
    // Shape is guaranteed by the type the array was decoded against.
    let Value::Struct(pair) = item else {
        unreachable!("header array element decodes as a struct");
    };
    let mut pair = pair.into_iter();
    match (pair.next(), pair.next()) {
        (Some(Value::Byte(code)), Some(Value::Variant(value))) => {
            (code, Variant::new(*value))
        },
        _ => unreachable!("header entry decodes as (byte, variant)"),
    }
}
