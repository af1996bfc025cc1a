//! Request codec (client → server).
//!
//! Grammar of one inbound buffer:
//!
//! ```text
//! buffer  := frame*
//! frame   := '{' payload '}'
//! payload := '?' | '!' | field (',' field)*
//! field   := 'conn:' name | 'move:' digit{8} | 'leave' | 'exit' | 'chat:' text
//! name    := [A-Za-z0-9]{3,20}
//! text    := [word chars, space, . ! ? : ; ' " ( ) -]{1,100}
//! ```
//!
//! Validation is all-or-nothing: one bad byte anywhere rejects the whole
//! buffer and nothing in it is processed. Line breaks are stripped before
//! validation so the server can be driven from a terminal.

use std::sync::LazyLock;

use hnef_core::Move;
use regex::Regex;
use thiserror::Error;

use crate::wire_types::{
    ClientKey,
    FIELD_SEPARATOR,
    FRAME_END,
    FRAME_START,
    MAX_CHAT_LEN,
    MAX_NAME_LEN,
    MAX_READ_LEN,
    MIN_NAME_LEN,
    PING,
    PONG,
    VALUE_SEPARATOR,
};

static VALID_BUFFER: LazyLock<Regex> = LazyLock::new(|| {
    let field = format!(
        r#"(?:conn:[A-Za-z0-9]{{{MIN_NAME_LEN},{MAX_NAME_LEN}}}|move:[0-9]{{8}}|leave|exit|chat:[\w .!?:;'"()\-]{{1,{MAX_CHAT_LEN}}})"#
    );
    let pattern = format!(r"^(?:\{{(?:\?|!|{field}(?:,{field})*)\}})*$");
    Regex::new(&pattern).expect("request grammar is a valid regex")
});

static FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("frame pattern is a valid regex"));

/// One decoded field of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Pong,
    Connect(String),
    Move(Move),
    Leave,
    Chat(String),
    Exit,
}

impl Command {
    /// Wire text of this field, without the surrounding braces.
    pub fn encode(&self) -> String {
        match self {
            Command::Ping => PING.to_string(),
            Command::Pong => PONG.to_string(),
            Command::Connect(name) => keyed(ClientKey::Connect, name),
            Command::Move(mv) => keyed(ClientKey::Move, &mv.encode()),
            Command::Leave => ClientKey::Leave.as_str().to_string(),
            Command::Chat(text) => keyed(ClientKey::Chat, text),
            Command::Exit => ClientKey::Exit.as_str().to_string(),
        }
    }

    /// Short name for logs.
    pub fn key(&self) -> &'static str {
        match self {
            Command::Ping => "ping",
            Command::Pong => "pong",
            Command::Connect(_) => ClientKey::Connect.as_str(),
            Command::Move(_) => ClientKey::Move.as_str(),
            Command::Leave => ClientKey::Leave.as_str(),
            Command::Chat(_) => ClientKey::Chat.as_str(),
            Command::Exit => ClientKey::Exit.as_str(),
        }
    }
}

/// Everything carried by one `{...}` frame, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub commands: Vec<Command>,
}

/// Why an inbound buffer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("read of {0} bytes exceeds the flood limit")]
    Flooding(usize),

    #[error("buffer is not valid UTF-8")]
    NotUtf8,

    #[error("buffer does not match the frame grammar")]
    InvalidFormat,
}

/// Whether the whole buffer is zero or more well-formed frames.
pub fn validate(buffer: &str) -> bool {
    VALID_BUFFER.is_match(buffer)
}

/// Split a buffer into requests, one per frame.
///
/// Meant for buffers that passed [`validate`]; anything the grammar
/// would reject is skipped.
pub fn parse(buffer: &str) -> Vec<Request> {
    FRAME
        .captures_iter(buffer)
        .filter_map(|caps| caps.get(1))
        .map(|payload| Request {
            commands: parse_payload(payload.as_str()),
        })
        .collect()
}

/// Turn one raw read into requests.
///
/// Fails without producing anything if the read is too large, not
/// UTF-8, or not entirely made of valid frames.
pub fn decode(raw: &[u8]) -> Result<Vec<Request>, ProtocolError> {
    if raw.len() > MAX_READ_LEN {
        return Err(ProtocolError::Flooding(raw.len()));
    }

    let text = std::str::from_utf8(raw).map_err(|_| ProtocolError::NotUtf8)?;
    let buffer = strip_line_breaks(text);

    if !validate(&buffer) {
        return Err(ProtocolError::InvalidFormat);
    }

    Ok(parse(&buffer))
}

/// Wrap commands into a single frame.
pub fn encode_request(commands: &[Command]) -> String {
    let fields: Vec<String> = commands.iter().map(Command::encode).collect();
    format!("{{{}}}", fields.join(&FIELD_SEPARATOR.to_string()))
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

/// Drop CR/LF between frames. Inside a frame they are kept, so the
/// grammar rejects them.
fn strip_line_breaks(text: &str) -> String {
    let mut inside = false;
    text.chars()
        .filter(|&c| {
            match c {
                FRAME_START => inside = true,
                FRAME_END => inside = false,
                '\n' | '\r' => return inside,
                _ => {}
            }
            true
        })
        .collect()
}

fn parse_payload(payload: &str) -> Vec<Command> {
    if payload.len() == 1 {
        match payload.chars().next() {
            Some(PING) => return vec![Command::Ping],
            Some(PONG) => return vec![Command::Pong],
            _ => {}
        }
    }

    payload.split(FIELD_SEPARATOR).filter_map(parse_field).collect()
}

fn parse_field(field: &str) -> Option<Command> {
    let (key, value) = match field.split_once(VALUE_SEPARATOR) {
        Some((key, value)) => (key, Some(value)),
        None => (field, None),
    };

    match (ClientKey::from_key(key)?, value) {
        (ClientKey::Connect, Some(name)) => Some(Command::Connect(name.to_string())),
        (ClientKey::Move, Some(coords)) => coords.parse().ok().map(Command::Move),
        (ClientKey::Chat, Some(text)) => Some(Command::Chat(text.to_string())),
        (ClientKey::Leave, None) => Some(Command::Leave),
        (ClientKey::Exit, None) => Some(Command::Exit),
        _ => None,
    }
}

fn keyed(key: ClientKey, value: &str) -> String {
    format!("{}{}{}", key.as_str(), VALUE_SEPARATOR, value)
}
