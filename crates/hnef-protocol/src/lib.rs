//! hnef-protocol
//!
//! Wire-level encoding/decoding for the Hnefatafl server.
//!
//! Every message travels as a brace-wrapped frame, `{payload}`, and a
//! single read may carry several frames back to back.
//!
//! - [`frame_codec`] : client → server requests (validate, parse, encode)
//! - [`message`]     : server → client messages (encode, decode)
//! - [`wire_types`]  : field keys, opcodes and size limits

pub mod wire_types;
pub mod frame_codec;
pub mod message;

pub use frame_codec::{
    decode,
    encode_request,
    parse,
    validate,
    Command,
    ProtocolError,
    Request,
};
pub use message::{parse_server, ServerMessage};
