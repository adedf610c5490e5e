//! Decode fuzzer: arbitrary bytes must never panic the decoder.
//!
//! Any input either decodes to a valid message or fails with one of the
//! three error classes. When a message does decode, it must re-encode, and
//! the re-encoding must be a fixed point: decoding it and encoding again
//! yields identical bytes. (Byte comparison rather than message comparison
//! keeps NaN-carrying doubles from tripping the oracle.)

#![no_main]

use courier_proto::Message;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = data;
    let Ok(message) = Message::decode(&mut reader) else {
        return;
    };

    let wire = message
        .encode()
        .expect("a decoded message must re-encode");
    let again = Message::decode(&mut wire.as_ref())
        .expect("a re-encoded message must decode");
    assert_eq!(again.encode().expect("still encodable"), wire);
});
