// crates/hnef-server/tests/common/mod.rs
//
// Drives a `Hub` synchronously, standing in for the connection tasks.
#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};

use hnef_protocol::{parse_server, ServerMessage};
use hnef_server::config::Config;
use hnef_server::types::{ClientId, Outbound, OutboundRx};
use hnef_server::{Hub, State};
use tokio::sync::mpsc;

pub const BUDGET: u32 = 3;

pub fn config() -> Config {
    Config {
        max_clients: 10,
        max_rooms: 5,
        decay_budget: BUDGET,
        ..Config::default()
    }
}

pub fn hub() -> Hub {
    Hub::new(&config())
}

pub fn addr(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
}

/// A fake transport: the receiving end of what the hub queues.
pub struct Peer {
    pub id: ClientId,
    rx: OutboundRx,
    closed: bool,
}

impl Peer {
    /// Inject one read.
    pub fn send(&self, hub: &mut Hub, raw: &str) {
        hub.receive(self.id, raw.as_bytes());
    }

    /// Everything queued since the last call, decoded.
    pub fn messages(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(item) = self.rx.try_recv() {
            match item {
                Outbound::Frame(frame) => out.extend(parse_server(&frame)),
                Outbound::Close => self.closed = true,
            }
        }
        out
    }

    /// Whether the hub asked this transport to close.
    pub fn closed(&mut self) -> bool {
        self.messages();
        self.closed
    }

    pub fn state(&self, hub: &Hub) -> Option<State> {
        hub.client(self.id).map(|c| c.state)
    }
}

/// Accept a connection with id `n` from `addr`.
pub fn connect(hub: &mut Hub, n: u64, addr: IpAddr) -> Peer {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = ClientId(n);
    hub.accept(id, addr, tx);
    Peer { id, rx, closed: false }
}

/// Accept a connection and log in as `name`, discarding the replies.
pub fn login(hub: &mut Hub, n: u64, name: &str) -> Peer {
    let mut peer = connect(hub, n, addr(n as u8));
    peer.send(hub, &format!("{{conn:{name}}}"));
    peer.messages();
    peer
}

/// Two logged-in players in one room: black (on turn) and white.
pub fn game(hub: &mut Hub) -> (Peer, Peer) {
    let mut black = login(hub, 1, "alice");
    let mut white = login(hub, 2, "bob");
    hub.matchmake();
    black.messages();
    white.messages();
    (black, white)
}

pub fn playfield_of(messages: &[ServerMessage]) -> Option<&str> {
    messages.iter().find_map(|m| match m {
        ServerMessage::Playfield(digits) => Some(digits.as_str()),
        _ => None,
    })
}
