//! Game lobby: the set of running rooms and the matchmaker that fills it.

use indexmap::IndexMap;
use tracing::info;

use hnef_core::{Room, RoomId};

use crate::registry::Registry;
use crate::session::State;
use crate::types::ClientId;

/// A room the matchmaker just opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub room: RoomId,
    pub black: ClientId,
    pub white: ClientId,
}

#[derive(Debug)]
pub struct Lobby {
    rooms: IndexMap<RoomId, Room>,
    max_rooms: usize,
    rooms_total: RoomId,
}

impl Lobby {
    pub fn new(max_rooms: usize) -> Self {
        Self {
            rooms: IndexMap::new(),
            max_rooms,
            rooms_total: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rooms.len() >= self.max_rooms
    }

    /// Rooms ever created.
    pub fn rooms_total(&self) -> RoomId {
        self.rooms_total
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    /// Open a room with the next id. Black moves first.
    pub fn create_room(&mut self, black: &str, white: &str) -> RoomId {
        self.rooms_total += 1;
        let id = self.rooms_total;
        self.rooms.insert(id, Room::new(id, black, white));
        id
    }

    pub fn destroy_room(&mut self, id: RoomId) -> Option<Room> {
        self.rooms.shift_remove(&id)
    }

    /// Pair `Waiting` clients into new rooms.
    ///
    /// One pass in registry order: the first waiting client found is
    /// paired with the next one after it and plays Black. Both get
    /// their room and playing state; nothing is sent from here.
    pub fn matchmake(&mut self, registry: &mut Registry) -> Vec<Pairing> {
        let mut pairings = Vec::new();
        let mut pending: Option<ClientId> = None;

        for id in registry.ids() {
            if self.is_full() {
                break;
            }
            let Some(client) = registry.get(id) else {
                continue;
            };
            if client.state != State::Waiting || client.name.is_empty() {
                continue;
            }

            let Some(black) = pending.take() else {
                pending = Some(id);
                continue;
            };

            let (Some(black_name), Some(white_name)) = (registry.name_of(black), registry.name_of(id)) else {
                continue;
            };
            let room = self.create_room(black_name, white_name);
            info!(room, black = black_name, white = white_name, "room created");

            if let Some(c) = registry.get_mut(black) {
                c.room = Some(room);
                c.set_active_state(State::PlayingOnTurn);
            }
            if let Some(c) = registry.get_mut(id) {
                c.room = Some(room);
                c.set_active_state(State::PlayingOnStand);
            }

            pairings.push(Pairing { room, black, white: id });
        }

        pairings
    }
}
