//! Server → client messages.
//!
//! Every message is one frame holding one field:
//!
//! | message                | wire                 |
//! |------------------------|----------------------|
//! | ping / pong            | `{?}` / `{!}`        |
//! | connected / reconnected| `{conn_ok}` / `{recn_ok}` |
//! | entered lobby / game   | `{lobby}` / `{game}` |
//! | move valid / invalid   | `{mv_ok}` / `{mv_bad}` |
//! | your / opponent's turn | `{turn_you}` / `{turn_opn}` |
//! | playfield              | `{pf:<121 digits>}`  |
//! | game won / lost        | `{win}` / `{loss}`   |
//! | left the game          | `{leave_ok}`         |
//! | opponent name / move   | `{opn_name:<name>}` / `{opn_move:<xxyyxxyy>}` |
//! | opponent left / gone   | `{opn_leave}` / `{opn_gone}` |
//! | opponent lost / disconnected / back | `{opn_lost}` / `{opn_disc}` / `{opn_recn}` |
//! | chat from opponent     | `{chat:<text>}`      |
//! | server full / name used| `{many}` / `{name_used}` |
//! | kicked / shutting down | `{kick}` / `{shutdown}` |

use hnef_core::Move;

use crate::wire_types::{FRAME_END, FRAME_START, PING, PONG, VALUE_SEPARATOR};

/// A message the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Ping,
    Pong,
    ConnectOk,
    ReconnectOk,
    Lobby,
    Game,
    MoveValid,
    MoveInvalid,
    TurnYours,
    TurnOpponent,
    Playfield(String),
    Won,
    Lost,
    LeaveOk,
    OpponentName(String),
    OpponentMove(Move),
    OpponentLeft,
    OpponentGone,
    OpponentLost,
    OpponentDisconnected,
    OpponentReconnected,
    Chat(String),
    TooManyClients,
    NameInUse,
    Kick,
    Shutdown,
}

impl ServerMessage {
    /// Wire frame for this message.
    pub fn encode(&self) -> String {
        let payload = match self {
            ServerMessage::Ping => PING.to_string(),
            ServerMessage::Pong => PONG.to_string(),
            ServerMessage::Playfield(digits) => keyed("pf", digits),
            ServerMessage::OpponentName(name) => keyed("opn_name", name),
            ServerMessage::OpponentMove(mv) => keyed("opn_move", &mv.encode()),
            ServerMessage::Chat(text) => keyed("chat", text),
            other => other.bare_key().unwrap_or_default().to_string(),
        };
        format!("{FRAME_START}{payload}{FRAME_END}")
    }

    /// Key of the messages that carry no value.
    fn bare_key(&self) -> Option<&'static str> {
        let key = match self {
            ServerMessage::ConnectOk => "conn_ok",
            ServerMessage::ReconnectOk => "recn_ok",
            ServerMessage::Lobby => "lobby",
            ServerMessage::Game => "game",
            ServerMessage::MoveValid => "mv_ok",
            ServerMessage::MoveInvalid => "mv_bad",
            ServerMessage::TurnYours => "turn_you",
            ServerMessage::TurnOpponent => "turn_opn",
            ServerMessage::Won => "win",
            ServerMessage::Lost => "loss",
            ServerMessage::LeaveOk => "leave_ok",
            ServerMessage::OpponentLeft => "opn_leave",
            ServerMessage::OpponentGone => "opn_gone",
            ServerMessage::OpponentLost => "opn_lost",
            ServerMessage::OpponentDisconnected => "opn_disc",
            ServerMessage::OpponentReconnected => "opn_recn",
            ServerMessage::TooManyClients => "many",
            ServerMessage::NameInUse => "name_used",
            ServerMessage::Kick => "kick",
            ServerMessage::Shutdown => "shutdown",
            _ => return None,
        };
        Some(key)
    }

    /// Decode one frame payload (the text between the braces).
    pub fn from_payload(payload: &str) -> Option<Self> {
        if payload.len() == 1 {
            match payload.chars().next() {
                Some(PING) => return Some(ServerMessage::Ping),
                Some(PONG) => return Some(ServerMessage::Pong),
                _ => {}
            }
        }

        if let Some((key, value)) = payload.split_once(VALUE_SEPARATOR) {
            return match key {
                "pf" => Some(ServerMessage::Playfield(value.to_string())),
                "opn_name" => Some(ServerMessage::OpponentName(value.to_string())),
                "opn_move" => value.parse().ok().map(ServerMessage::OpponentMove),
                "chat" => Some(ServerMessage::Chat(value.to_string())),
                _ => None,
            };
        }

        let msg = match payload {
            "conn_ok" => ServerMessage::ConnectOk,
            "recn_ok" => ServerMessage::ReconnectOk,
            "lobby" => ServerMessage::Lobby,
            "game" => ServerMessage::Game,
            "mv_ok" => ServerMessage::MoveValid,
            "mv_bad" => ServerMessage::MoveInvalid,
            "turn_you" => ServerMessage::TurnYours,
            "turn_opn" => ServerMessage::TurnOpponent,
            "win" => ServerMessage::Won,
            "loss" => ServerMessage::Lost,
            "leave_ok" => ServerMessage::LeaveOk,
            "opn_leave" => ServerMessage::OpponentLeft,
            "opn_gone" => ServerMessage::OpponentGone,
            "opn_lost" => ServerMessage::OpponentLost,
            "opn_disc" => ServerMessage::OpponentDisconnected,
            "opn_recn" => ServerMessage::OpponentReconnected,
            "many" => ServerMessage::TooManyClients,
            "name_used" => ServerMessage::NameInUse,
            "kick" => ServerMessage::Kick,
            "shutdown" => ServerMessage::Shutdown,
            _ => return None,
        };
        Some(msg)
    }
}

/// Split a stream chunk from the server into messages.
///
/// Unknown frames are skipped; a trailing partial frame is ignored.
pub fn parse_server(buffer: &str) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    let mut rest = buffer;

    while let Some(start) = rest.find(FRAME_START) {
        let Some(len) = rest[start..].find(FRAME_END) else {
            break;
        };
        if let Some(msg) = ServerMessage::from_payload(&rest[start + 1..start + len]) {
            out.push(msg);
        }
        rest = &rest[start + len + 1..];
    }

    out
}

fn keyed(key: &str, value: &str) -> String {
    format!("{key}{VALUE_SEPARATOR}{value}")
}
