//! Session registry: every known client record, in arrival order.
//!
//! Records are keyed by a stable [`ClientId`]. Rooms and reconnections
//! refer to clients by name, re-resolved here, never by a held
//! reference, so records can be inserted and removed freely.

use indexmap::IndexMap;

use crate::session::{Client, State};
use crate::types::{ClientId, OutboundTx};

#[derive(Debug, Default)]
pub struct Registry {
    clients: IndexMap<ClientId, Client>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn insert(&mut self, id: ClientId, client: Client) {
        self.clients.insert(id, client);
    }

    /// Remove a record, keeping the order of the others.
    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        self.clients.shift_remove(&id)
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    /// Place of `id` in registry order.
    pub fn position(&self, id: ClientId) -> Option<usize> {
        self.clients.get_index_of(&id)
    }

    /// Snapshot of the ids in registry order.
    ///
    /// Walk this instead of the map when records may be removed on the way.
    pub fn ids(&self) -> Vec<ClientId> {
        self.clients.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClientId, &Client)> {
        self.clients.iter().map(|(id, c)| (*id, c))
    }

    /// Record currently holding `name`. Empty names never match.
    pub fn find_by_name(&self, name: &str) -> Option<ClientId> {
        if name.is_empty() {
            return None;
        }
        self.iter().find(|(_, c)| c.name == name).map(|(id, _)| id)
    }

    /// Name of a client, if it has one.
    pub fn name_of(&self, id: ClientId) -> Option<&str> {
        self.get(id).map(|c| c.name.as_str()).filter(|n| !n.is_empty())
    }

    /// The disconnected record closest to eviction.
    pub fn longest_disconnected(&self) -> Option<ClientId> {
        self.iter()
            .filter(|(_, c)| c.state == State::Disconnected)
            .min_by_key(|(_, c)| c.decay)
            .map(|(id, _)| id)
    }

    /// Move a lineage's identity from `from` to `to`.
    ///
    /// `to` takes the name, room, saved state and the restored state;
    /// `from` is left abandoned with no name, room or transport. Returns
    /// the abandoned transport so the caller can close it.
    pub fn transfer_identity(
        &mut self,
        from: ClientId,
        to: ClientId,
        decay_budget: u32,
    ) -> Option<OutboundTx> {
        if from == to || !self.contains(to) {
            return None;
        }

        let old = self.get_mut(from)?;
        let name = std::mem::take(&mut old.name);
        let room = old.room.take();
        let state_prev = old.state_prev;
        let stale_transport = old.transport.take();

        let new = self.get_mut(to)?;
        new.name = name;
        new.room = room;
        new.state_prev = state_prev;
        new.state = state_prev;
        new.decay = decay_budget;

        stale_transport
    }
}
