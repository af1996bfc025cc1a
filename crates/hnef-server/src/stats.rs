//! Runtime counters reported at shutdown.

use tracing::info;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub clients_connected: u64,
    pub clients_disconnected: u64,
    pub clients_reconnected: u64,
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub rooms_created: u64,
}

impl Stats {
    pub fn log(&self) {
        info!(
            connected = self.clients_connected,
            disconnected = self.clients_disconnected,
            reconnected = self.clients_reconnected,
            bytes_received = self.bytes_received,
            bytes_sent = self.bytes_sent,
            rooms_created = self.rooms_created,
            "server statistics"
        );
    }
}
