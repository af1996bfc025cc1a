//! Low-level wire types and constants.
//!
//! This module defines:
//! - the frame delimiters and bare liveness opcodes,
//! - the field keys clients may send,
//! - size limits for values and inbound reads.
//!
//! The actual grammar and parsing live in `frame_codec`.

/// Opens a frame.
pub const FRAME_START: char = '{';

/// Closes a frame.
pub const FRAME_END: char = '}';

/// Separates fields inside a payload.
pub const FIELD_SEPARATOR: char = ',';

/// Separates a field's key from its value.
pub const VALUE_SEPARATOR: char = ':';

/// Bare payload asking the peer to answer.
pub const PING: char = '?';

/// Bare payload answering a ping.
pub const PONG: char = '!';

/// Field keys (client → server).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ClientKey {
    /// `conn:<name>`
    Connect,
    /// `move:<xxyyxxyy>`
    Move,
    /// `leave`
    Leave,
    /// `chat:<text>`
    Chat,
    /// `exit`
    Exit,
}

impl ClientKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ClientKey::Connect => "conn",
            ClientKey::Move => "move",
            ClientKey::Leave => "leave",
            ClientKey::Chat => "chat",
            ClientKey::Exit => "exit",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s {
            "conn" => Some(ClientKey::Connect),
            "move" => Some(ClientKey::Move),
            "leave" => Some(ClientKey::Leave),
            "chat" => Some(ClientKey::Chat),
            "exit" => Some(ClientKey::Exit),
            _ => None,
        }
    }
}

/// Shortest accepted player name.
pub const MIN_NAME_LEN: usize = 3;

/// Longest accepted player name.
pub const MAX_NAME_LEN: usize = 20;

/// Longest accepted chat text.
pub const MAX_CHAT_LEN: usize = 100;

/// Size of the server's receive buffer.
pub const RECV_BUFFER_LEN: usize = 1024;

/// Longest legal frame (`{chat:` + 100 characters + `}`).
pub const LONGEST_FRAME_LEN: usize = 106;

/// Largest single read the server accepts.
///
/// A turn-based game never needs to fill the receive buffer in one
/// read; anything bigger is treated as flooding.
pub const MAX_READ_LEN: usize = RECV_BUFFER_LEN - 1 - LONGEST_FRAME_LEN;
