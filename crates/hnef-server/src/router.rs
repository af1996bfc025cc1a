//! Message router: checks each command against the client's state and
//! runs the matching handler.
//!
//! Allowed combinations:
//!
//! | command   | allowed while                                             |
//! |-----------|-----------------------------------------------------------|
//! | ping/pong | any state                                                 |
//! | `conn`    | any state (a named client may only repeat its own name)   |
//! | `move`    | `PlayingOnTurn`, or `Pinged` after `PlayingOnTurn`        |
//! | `leave`   | playing, or `Pinged` after playing                        |
//! | `chat`    | playing, or `Pinged` after playing                        |
//! | `exit`    | once named                                                |
//!
//! Anything else is a protocol violation and disconnects the client.

use std::fmt;

use tracing::{debug, info, trace, warn};

use hnef_core::{GameStatus, Move};
use hnef_protocol::{Command, ServerMessage};

use crate::hub::{close, Hub};
use crate::resolver::{resolve, Resolution};
use crate::session::State;
use crate::types::ClientId;

/// What the caller should do with the client after a command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Disconnect(DropReason),
}

/// Why a client record is being removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The read did not decode into frames.
    InvalidData,
    /// A valid command the client's state does not allow.
    ProtocolViolation,
    /// The client said goodbye.
    Exit,
    /// The transport closed from the client's side.
    Logout,
    /// Decay budget used up, or an abandoned record.
    Evicted,
    /// Removed to make room for a new connection.
    Reclaimed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropReason::InvalidData => "invalid data",
            DropReason::ProtocolViolation => "violation of protocol",
            DropReason::Exit => "exit",
            DropReason::Logout => "logout",
            DropReason::Evicted => "evicted",
            DropReason::Reclaimed => "reclaimed for a new connection",
        };
        f.write_str(s)
    }
}

/// Whether `command` may run for a client in `state`.
///
/// `state_prev` matters only while `Pinged`: a pinged player keeps the
/// rights of the state it was pinged from.
pub fn is_allowed(command: &Command, state: State, state_prev: State, named: bool) -> bool {
    let effective = if state == State::Pinged { state_prev } else { state };
    match command {
        Command::Ping | Command::Pong | Command::Connect(_) => true,
        Command::Move(_) => effective == State::PlayingOnTurn,
        Command::Leave | Command::Chat(_) => effective.is_playing(),
        Command::Exit => named,
    }
}

/// Route one command from `id`.
pub fn dispatch(hub: &mut Hub, id: ClientId, command: Command) -> Outcome {
    let Some(client) = hub.registry.get(id) else {
        return Outcome::Continue;
    };
    if !is_allowed(&command, client.state, client.state_prev, !client.name.is_empty()) {
        warn!(
            client = %id,
            name = %client.name,
            state = %client.state,
            command = command.key(),
            "command not allowed in this state"
        );
        return Outcome::Disconnect(DropReason::ProtocolViolation);
    }

    match command {
        Command::Ping => {
            hub.send(id, ServerMessage::Pong);
            Outcome::Continue
        }
        Command::Pong => on_pong(hub, id),
        Command::Connect(name) => on_connect(hub, id, name),
        Command::Move(mv) => on_move(hub, id, mv),
        Command::Leave => on_leave(hub, id),
        Command::Chat(text) => {
            hub.send_to_opponent(id, ServerMessage::Chat(text));
            Outcome::Continue
        }
        Command::Exit => Outcome::Disconnect(DropReason::Exit),
    }
}

fn on_pong(hub: &mut Hub, id: ClientId) -> Outcome {
    let decay_budget = hub.decay_budget;
    let Some(client) = hub.registry.get_mut(id) else {
        return Outcome::Continue;
    };
    let was_lost = client.state == State::Lost;
    if matches!(client.state, State::Pinged | State::Lost) {
        client.restore(decay_budget);
        trace!(client = %id, state = %client.state, "pong");
    }
    if was_lost && client.state.is_playing() {
        hub.send_to_opponent(id, ServerMessage::OpponentReconnected);
    }
    Outcome::Continue
}

fn on_connect(hub: &mut Hub, id: ClientId, name: String) -> Outcome {
    let decay_budget = hub.decay_budget;
    let Some(client) = hub.registry.get_mut(id) else {
        return Outcome::Continue;
    };

    // Already named: only the client's own name makes sense.
    if !client.name.is_empty() {
        if client.name != name {
            warn!(client = %id, name = %client.name, requested = %name, "connect under another name");
            return Outcome::Disconnect(DropReason::ProtocolViolation);
        }
        match resolve(Some(&*client), client.addr) {
            Resolution::ShortReconnect => {
                client.restore(decay_budget);
                info!(client = %id, %name, state = %client.state, "reconnected");
                hub.stats.clients_reconnected += 1;
                resume(hub, id);
            }
            _ => hub.send(id, ServerMessage::NameInUse),
        }
        return Outcome::Continue;
    }

    // An unnamed client answering at all is alive.
    client.restore(decay_budget);
    let addr = client.addr;

    let existing = hub.registry.find_by_name(&name);
    match resolve(existing.and_then(|e| hub.registry.get(e)), addr) {
        Resolution::Fresh => {
            if let Some(client) = hub.registry.get_mut(id) {
                client.name = name;
                client.set_active_state(State::Waiting);
                info!(client = %id, name = %client.name, "connected");
            }
            hub.send(id, ServerMessage::ConnectOk);
            hub.send(id, ServerMessage::Lobby);
        }
        Resolution::NameInUse => {
            debug!(client = %id, %name, "name already in use");
            hub.send(id, ServerMessage::NameInUse);
        }
        resolution @ (Resolution::ShortReconnect | Resolution::LongReconnect) => {
            let Some(old) = existing else {
                return Outcome::Continue;
            };
            close(hub.registry.transfer_identity(old, id, decay_budget));
            info!(client = %id, abandoned = %old, %name, ?resolution, "reconnected");
            hub.stats.clients_reconnected += 1;
            resume(hub, id);
        }
    }

    Outcome::Continue
}

/// Tell a reconnected client where it is, and its opponent that it is back.
fn resume(hub: &mut Hub, id: ClientId) {
    hub.send(id, ServerMessage::ReconnectOk);
    hub.send_context(id);
    hub.send_to_opponent(id, ServerMessage::OpponentReconnected);
}

fn on_move(hub: &mut Hub, id: ClientId, mv: Move) -> Outcome {
    let Some(client) = hub.registry.get(id) else {
        return Outcome::Continue;
    };
    let name = client.name.clone();
    let Some(room_id) = client.room else {
        warn!(client = %id, %name, "move without a room");
        return Outcome::Disconnect(DropReason::ProtocolViolation);
    };
    let Some(room) = hub.lobby.room_mut(room_id) else {
        warn!(client = %id, %name, room = room_id, "move in a room that no longer exists");
        return Outcome::Disconnect(DropReason::ProtocolViolation);
    };

    let report = match room.play(&name, mv) {
        Ok(report) => report,
        Err(e) => {
            debug!(client = %id, %name, %mv, error = %e, "invalid move");
            hub.send(id, ServerMessage::MoveInvalid);
            return Outcome::Continue;
        }
    };
    let playfield = room.playfield_string();
    let mover_side = room.side_of(&name);
    let status = room.status();
    trace!(room = room_id, %name, %mv, captured = report.captured.len(), "move");

    let opponent = hub.opponent_of(id);

    hub.send(id, ServerMessage::MoveValid);
    hub.send(id, ServerMessage::Playfield(playfield.clone()));
    if let Some(opponent) = opponent {
        hub.send(opponent, ServerMessage::OpponentMove(mv));
        hub.send(opponent, ServerMessage::Playfield(playfield));
    }

    match status {
        GameStatus::Over { winner } => {
            let mover_won = mover_side == Some(winner);
            let (mine, theirs) = if mover_won {
                (ServerMessage::Won, ServerMessage::Lost)
            } else {
                (ServerMessage::Lost, ServerMessage::Won)
            };
            info!(room = room_id, %name, ?winner, "game over");

            hub.send(id, mine);
            hub.lobby.destroy_room(room_id);
            hub.return_to_lobby(id);
            if let Some(opponent) = opponent {
                hub.send(opponent, theirs);
                hub.return_to_lobby(opponent);
            }
        }
        GameStatus::Playing => {
            if let Some(client) = hub.registry.get_mut(id) {
                client.set_active_state(State::PlayingOnStand);
            }
            hub.send(id, ServerMessage::TurnOpponent);
            if let Some(opponent) = opponent {
                if let Some(client) = hub.registry.get_mut(opponent) {
                    client.set_active_state(State::PlayingOnTurn);
                }
                hub.send(opponent, ServerMessage::TurnYours);
            }
        }
    }

    Outcome::Continue
}

fn on_leave(hub: &mut Hub, id: ClientId) -> Outcome {
    let in_room = hub.registry.get(id).is_some_and(|c| c.room.is_some());
    if !in_room {
        warn!(client = %id, "leave without a room");
        return Outcome::Disconnect(DropReason::ProtocolViolation);
    }

    hub.send(id, ServerMessage::LeaveOk);
    hub.close_room(id, ServerMessage::OpponentLeft);
    hub.return_to_lobby(id);
    Outcome::Continue
}
