//! The hub: all session and game state behind one lock.
//!
//! The event loop and the liveness supervisor both take the same
//! `Mutex<Hub>` for one unit of work each (a batch of transport events,
//! or one sweep). Everything here is synchronous; outbound frames are
//! only queued on per-connection channels, never written while locked.

use std::net::IpAddr;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use hnef_protocol::{decode, ServerMessage};

use crate::config::Config;
use crate::lobby::Lobby;
use crate::registry::Registry;
use crate::router::{self, DropReason, Outcome};
use crate::session::{Client, State};
use crate::stats::Stats;
use crate::types::{ClientId, Event, Outbound, OutboundTx};

/// Hub handle shared between the event loop and the supervisor.
pub type SharedHub = Arc<Mutex<Hub>>;

#[derive(Debug)]
pub struct Hub {
    pub(crate) registry: Registry,
    pub(crate) lobby: Lobby,
    pub(crate) stats: Stats,
    pub(crate) max_clients: usize,
    pub(crate) decay_budget: u32,
}

impl Hub {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: Registry::new(),
            lobby: Lobby::new(config.max_rooms),
            stats: Stats::default(),
            max_clients: config.max_clients,
            decay_budget: config.decay_budget,
        }
    }

    pub fn shared(config: &Config) -> SharedHub {
        Arc::new(Mutex::new(Self::new(config)))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.registry.get(id)
    }

    /// Apply one transport event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Connected { id, addr, tx } => {
                self.accept(id, addr, tx);
            }
            Event::Data { id, bytes } => self.receive(id, &bytes),
            Event::Closed { id } => self.connection_closed(id),
            Event::WriteFailed { id } => self.write_failed(id),
        }
    }

    /// Apply a batch of transport events, client by client in registry
    /// order, then matchmake once.
    ///
    /// Each client's events keep their arrival order. Connections not
    /// registered yet go last, in the order they arrived.
    pub fn handle_batch(&mut self, mut events: Vec<Event>) {
        events.sort_by_key(|e| self.registry.position(e.client()).unwrap_or(usize::MAX));
        for event in events {
            self.handle_event(event);
        }
        self.matchmake();
    }

    /// Register a freshly accepted connection.
    ///
    /// When the registry is full the disconnected record closest to
    /// eviction is reclaimed; if there is none the newcomer is told the
    /// server is full and closed. Returns whether it was registered.
    pub fn accept(&mut self, id: ClientId, addr: IpAddr, tx: OutboundTx) -> bool {
        if self.registry.len() >= self.max_clients {
            match self.registry.longest_disconnected() {
                Some(victim) => self.drop_client(victim, DropReason::Reclaimed),
                None => {
                    warn!(client = %id, %addr, max_clients = self.max_clients, "rejecting connection, server full");
                    let frame = ServerMessage::TooManyClients.encode();
                    self.stats.bytes_sent += frame.len() as u64;
                    let _ = tx.send(Outbound::Frame(frame));
                    let _ = tx.send(Outbound::Close);
                    return false;
                }
            }
        }

        info!(client = %id, %addr, "new connection");
        self.registry.insert(id, Client::new(addr, tx, self.decay_budget));
        self.stats.clients_connected += 1;
        true
    }

    /// Decode one read from `id` and run every command in it.
    ///
    /// Invalid data or a command the client's state does not allow
    /// disconnects the client; the rest of the read is discarded.
    pub fn receive(&mut self, id: ClientId, raw: &[u8]) {
        self.stats.bytes_received += raw.len() as u64;
        // late reads from a transport the hub already detached
        let attached = self.registry.get(id).is_some_and(|c| c.transport.is_some());
        if !attached {
            return;
        }

        let requests = match decode(raw) {
            Ok(requests) => requests,
            Err(e) => {
                warn!(client = %id, error = %e, "invalid data");
                self.drop_client(id, DropReason::InvalidData);
                return;
            }
        };

        for command in requests.into_iter().flat_map(|r| r.commands) {
            debug!(client = %id, command = command.key(), "request");
            if let Outcome::Disconnect(reason) = router::dispatch(self, id, command) {
                self.drop_client(id, reason);
                return;
            }
        }
    }

    /// The peer closed its side, or reading failed: treat as logout.
    ///
    /// Transports the hub closed itself (disconnected or abandoned
    /// records) are already detached and are ignored here.
    pub fn connection_closed(&mut self, id: ClientId) {
        let attached = self
            .registry
            .get(id)
            .is_some_and(|c| c.transport.is_some());
        if attached {
            self.drop_client(id, DropReason::Logout);
        }
    }

    /// Writes to `id` keep failing: demote it to `Lost`.
    pub fn write_failed(&mut self, id: ClientId) {
        let Some(client) = self.registry.get_mut(id) else {
            return;
        };
        if matches!(client.state, State::Lost | State::Disconnected) {
            return;
        }
        warn!(client = %id, name = %client.name, "write failed, marking lost");
        client.mark_lost();
        let playing = client.state_prev.is_playing();
        if playing {
            self.send_to_opponent(id, ServerMessage::OpponentLost);
        }
    }

    /// Pair waiting clients and tell them about their new games.
    pub fn matchmake(&mut self) {
        for pairing in self.lobby.matchmake(&mut self.registry) {
            self.stats.rooms_created += 1;
            self.send_game_context(pairing.black);
            self.send_game_context(pairing.white);
        }
    }

    /// Tell every client the server is going down and close them all.
    pub fn shutdown(&mut self) {
        let ids = self.registry.ids();
        for &id in &ids {
            self.send(id, ServerMessage::Shutdown);
            if let Some(client) = self.registry.remove(id) {
                close(client.transport);
                self.stats.clients_disconnected += 1;
            }
        }
        info!(clients = ids.len(), rooms = self.lobby.len(), "server shutdown, all clients closed");
    }

    // -------------------------------------------------------------------------
    // Helpers shared by the router and the supervisor
    // -------------------------------------------------------------------------

    /// Queue `msg` for `id`. Silently skipped if it has no transport.
    pub(crate) fn send(&mut self, id: ClientId, msg: ServerMessage) {
        let Some(tx) = self.registry.get(id).and_then(|c| c.transport.as_ref()) else {
            return;
        };
        let frame = msg.encode();
        debug!(client = %id, %frame, "send");
        self.stats.bytes_sent += frame.len() as u64;
        let _ = tx.send(Outbound::Frame(frame));
    }

    /// The other player in `id`'s room, looked up by name.
    pub(crate) fn opponent_of(&self, id: ClientId) -> Option<ClientId> {
        let client = self.registry.get(id)?;
        let room = self.lobby.room(client.room?)?;
        let opponent = room.opponent_of(&client.name)?;
        self.registry.find_by_name(opponent)
    }

    pub(crate) fn send_to_opponent(&mut self, id: ClientId, msg: ServerMessage) {
        if let Some(opponent) = self.opponent_of(id) {
            self.send(opponent, msg);
        }
    }

    /// Game entry: opponent name, playfield and whose turn it is.
    pub(crate) fn send_game_context(&mut self, id: ClientId) {
        let Some(client) = self.registry.get(id) else {
            return;
        };
        let Some(room) = client.room.and_then(|r| self.lobby.room(r)) else {
            return;
        };
        let opponent = room.opponent_of(&client.name).unwrap_or_default().to_string();
        let playfield = room.playfield_string();
        let turn = if room.player_on_turn() == client.name {
            ServerMessage::TurnYours
        } else {
            ServerMessage::TurnOpponent
        };

        self.send(id, ServerMessage::Game);
        self.send(id, ServerMessage::OpponentName(opponent));
        self.send(id, ServerMessage::Playfield(playfield));
        self.send(id, turn);
    }

    /// Wherever the client is: its game, or the lobby.
    pub(crate) fn send_context(&mut self, id: ClientId) {
        let in_game = self
            .registry
            .get(id)
            .and_then(|c| c.room)
            .is_some_and(|r| self.lobby.room(r).is_some());
        if in_game {
            self.send_game_context(id);
        } else {
            self.send(id, ServerMessage::Lobby);
        }
    }

    /// Put `id` back in the lobby as `Waiting` and tell it so.
    pub(crate) fn return_to_lobby(&mut self, id: ClientId) {
        if let Some(client) = self.registry.get_mut(id) {
            client.room = None;
            client.set_active_state(State::Waiting);
        }
        self.send(id, ServerMessage::Lobby);
    }

    /// Tear down the room `id` sits in. The opponent gets `notice` and
    /// goes back to the lobby; `id` is only detached from the room.
    pub(crate) fn close_room(&mut self, id: ClientId, notice: ServerMessage) {
        let Some(room) = self.registry.get(id).and_then(|c| c.room) else {
            return;
        };
        let opponent = self.opponent_of(id);

        self.lobby.destroy_room(room);
        if let Some(client) = self.registry.get_mut(id) {
            client.room = None;
        }
        debug!(room, client = %id, "room closed");

        if let Some(opponent) = opponent {
            self.send(opponent, notice);
            self.return_to_lobby(opponent);
        }
    }

    /// Remove a record for good: its room is torn down, its transport
    /// closed.
    pub(crate) fn drop_client(&mut self, id: ClientId, reason: DropReason) {
        let Some(client) = self.registry.get(id) else {
            return;
        };
        match reason {
            DropReason::InvalidData | DropReason::ProtocolViolation => {
                warn!(client = %id, name = %client.name, %reason, "disconnecting client")
            }
            _ => info!(client = %id, name = %client.name, %reason, "removing client"),
        }

        self.close_room(id, ServerMessage::OpponentGone);
        if let Some(client) = self.registry.remove(id) {
            close(client.transport);
            self.stats.clients_disconnected += 1;
        }
    }
}

/// Ask a connection task to close its transport.
pub(crate) fn close(transport: Option<OutboundTx>) {
    if let Some(tx) = transport {
        let _ = tx.send(Outbound::Close);
    }
}
