//! Shared types for the Hnefatafl TCP server.
//!
//! This module defines:
//! - `ClientId`: a stable handle for one client record
//! - `Outbound`: what the hub asks a connection task to do
//! - `Event`: what connection tasks report back to the event loop
//! - channel aliases between the two

use std::fmt;
use std::net::IpAddr;

use bytes::Bytes;
use tokio::sync::mpsc;

/// Identifier for a client record.
///
/// Handed out from a monotonic counter and never reused, so a stale id
/// simply stops resolving once its record is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Instruction from the hub to one connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Write one encoded frame.
    Frame(String),
    /// Flush and close the transport.
    Close,
}

/// Outbound channel to a given connection.
pub type OutboundTx = mpsc::UnboundedSender<Outbound>;
pub type OutboundRx = mpsc::UnboundedReceiver<Outbound>;

/// Transport event flowing from a connection task into the event loop.
#[derive(Debug)]
pub enum Event {
    /// A TCP connection was accepted.
    Connected {
        id: ClientId,
        addr: IpAddr,
        tx: OutboundTx,
    },
    /// One read's worth of raw bytes.
    Data { id: ClientId, bytes: Bytes },
    /// The peer closed the connection, or reading from it failed.
    Closed { id: ClientId },
    /// A frame could not be written after all retries.
    WriteFailed { id: ClientId },
}

impl Event {
    /// The client this event is about.
    pub fn client(&self) -> ClientId {
        match self {
            Event::Connected { id, .. }
            | Event::Data { id, .. }
            | Event::Closed { id }
            | Event::WriteFailed { id } => *id,
        }
    }
}

/// Channel from connection tasks → event loop.
pub type EventTx = mpsc::UnboundedSender<Event>;
pub type EventRx = mpsc::UnboundedReceiver<Event>;
