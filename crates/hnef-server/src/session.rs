//! Per-client session record and its lifecycle state.

use std::fmt;
use std::net::IpAddr;

use hnef_core::RoomId;

use crate::types::OutboundTx;

/// Lifecycle state of a client.
///
/// Eviction is not a state: an evicted client simply has no record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum State {
    /// Connected, no name yet.
    New,
    /// Named, in the lobby, waiting to be matched.
    Waiting,
    PlayingOnTurn,
    PlayingOnStand,
    /// Sent a ping, no answer yet.
    Pinged,
    /// Missed a second ping.
    Lost,
    /// Transport closed; kept around for reconnection while the decay budget lasts.
    Disconnected,
}

impl State {
    pub const ALL: [State; 7] = [
        State::New,
        State::Waiting,
        State::PlayingOnTurn,
        State::PlayingOnStand,
        State::Pinged,
        State::Lost,
        State::Disconnected,
    ];

    pub fn is_playing(self) -> bool {
        matches!(self, State::PlayingOnTurn | State::PlayingOnStand)
    }

    /// States that stand in for a suspended logical state.
    pub fn is_liveness(self) -> bool {
        matches!(self, State::Pinged | State::Lost | State::Disconnected)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::New => "new",
            State::Waiting => "waiting",
            State::PlayingOnTurn => "playing, on turn",
            State::PlayingOnStand => "playing, on stand",
            State::Pinged => "pinged",
            State::Lost => "lost",
            State::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// One client record.
#[derive(Debug)]
pub struct Client {
    /// Display name; empty until connected, and again once the record
    /// has been abandoned in favor of a reconnection.
    pub name: String,
    /// Origin address, used to recognize reconnections.
    pub addr: IpAddr,
    /// Room the client sits in; `None` means the lobby.
    pub room: Option<RoomId>,
    pub state: State,
    /// State to restore after a ping round trip or a reconnection.
    pub state_prev: State,
    /// Sweeps left before a disconnected record is evicted.
    pub decay: u32,
    /// Outbound channel to the connection task, if the transport is open.
    pub transport: Option<OutboundTx>,
}

impl Client {
    pub fn new(addr: IpAddr, transport: OutboundTx, decay_budget: u32) -> Self {
        Self {
            name: String::new(),
            addr,
            room: None,
            state: State::New,
            state_prev: State::New,
            decay: decay_budget,
            transport: Some(transport),
        }
    }

    /// Abandoned records lost their identity to a reconnection and wait
    /// for the supervisor to reap them.
    pub fn is_abandoned(&self) -> bool {
        self.name.is_empty() && self.state != State::New
    }

    /// Apply a game-driven state change.
    ///
    /// While the client is pinged, lost or disconnected the change goes
    /// to `state_prev`, so the later restore lands on it.
    pub fn set_active_state(&mut self, state: State) {
        if self.state.is_liveness() {
            self.state_prev = state;
        } else {
            self.state = state;
        }
    }

    pub fn mark_pinged(&mut self) {
        self.state_prev = self.state;
        self.state = State::Pinged;
    }

    pub fn mark_lost(&mut self) {
        if !self.state.is_liveness() {
            self.state_prev = self.state;
        }
        self.state = State::Lost;
    }

    /// Close the record's transport and start the decay countdown.
    ///
    /// Returns the transport so the caller can tell it to close.
    pub fn mark_disconnected(&mut self, decay_budget: u32) -> Option<OutboundTx> {
        if !self.state.is_liveness() {
            self.state_prev = self.state;
        }
        self.state = State::Disconnected;
        self.decay = decay_budget;
        self.transport.take()
    }

    /// Return to the state saved before the outage.
    pub fn restore(&mut self, decay_budget: u32) {
        if self.state.is_liveness() {
            self.state = self.state_prev;
        }
        self.decay = decay_budget;
    }
}
