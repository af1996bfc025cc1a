//! Reconnection resolver.
//!
//! Decides what a `connect` with a given name means, given whatever
//! record already holds that name.

use std::net::IpAddr;

use crate::session::{Client, State};

/// Outcome of resolving a connect request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nobody holds the name: a brand new player.
    Fresh,
    /// Someone else holds it, or the same peer is still active under it.
    NameInUse,
    /// The holder missed one or two pings; resume where it left off.
    ShortReconnect,
    /// The holder's transport is already closed but its record survives.
    LongReconnect,
}

/// Resolve a connect request arriving from `origin` against the record
/// `existing` that currently holds the requested name, if any.
pub fn resolve(existing: Option<&Client>, origin: IpAddr) -> Resolution {
    let Some(existing) = existing else {
        return Resolution::Fresh;
    };

    if existing.addr != origin {
        return Resolution::NameInUse;
    }

    match existing.state {
        State::Pinged | State::Lost => Resolution::ShortReconnect,
        State::Disconnected if existing.decay > 0 => Resolution::LongReconnect,
        _ => Resolution::NameInUse,
    }
}
