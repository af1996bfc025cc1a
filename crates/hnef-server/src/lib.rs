//! hnef-server
//!
//! Multi-client async TCP session server for Hnefatafl: lobby,
//! matchmaking, liveness supervision and reconnection.
//!
//! All session and game state lives in one [`hub::Hub`] behind a single
//! lock, shared by the event loop and the liveness supervisor.

pub mod config;
pub mod types;
pub mod session;
pub mod registry;
pub mod resolver;
pub mod lobby;
pub mod router;
pub mod supervisor;
pub mod stats;
pub mod hub;
pub mod server;
pub mod connection;

// internal, not re-exported
mod event_loop;

pub use config::{Config, ConfigError};
pub use hub::{Hub, SharedHub};
pub use session::{Client, State};
pub use stats::Stats;
pub use types::ClientId;
