//! Liveness supervisor.
//!
//! Every ping period one sweep walks the registry in order and moves
//! each client one step down the ladder unless it answered since:
//!
//! ```text
//! Waiting/Playing --ping--> Pinged --ping--> Lost --kick--> Disconnected --decay--> evicted
//! ```
//!
//! A pong (or a reconnection) puts the client back on `state_prev`.
//! Unnamed clients go down the same ladder and are reaped as soon as
//! they are pinged without an answer, since they have no identity to
//! reconnect to.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use hnef_protocol::ServerMessage;

use crate::hub::{close, Hub, SharedHub};
use crate::router::DropReason;
use crate::session::State;

impl Hub {
    /// Run one liveness sweep.
    pub fn sweep(&mut self) {
        let decay_budget = self.decay_budget;

        for id in self.registry.ids() {
            let Some(client) = self.registry.get_mut(id) else {
                continue;
            };

            if client.is_abandoned() {
                self.drop_client(id, DropReason::Evicted);
                continue;
            }

            match client.state {
                State::Pinged => {
                    client.mark_lost();
                    let playing = client.state_prev.is_playing();
                    debug!(client = %id, name = %client.name, "lost");
                    self.send(id, ServerMessage::Ping);
                    if playing {
                        self.send_to_opponent(id, ServerMessage::OpponentLost);
                    }
                }
                State::Lost => {
                    info!(client = %id, name = %client.name, "disconnected, awaiting reconnection");
                    self.send(id, ServerMessage::Kick);
                    if let Some(client) = self.registry.get_mut(id) {
                        close(client.mark_disconnected(decay_budget));
                    }
                    self.send_to_opponent(id, ServerMessage::OpponentDisconnected);
                }
                State::Disconnected => {
                    client.decay = client.decay.saturating_sub(1);
                    if client.decay == 0 {
                        self.drop_client(id, DropReason::Evicted);
                    }
                }
                State::New | State::Waiting | State::PlayingOnTurn | State::PlayingOnStand => {
                    client.mark_pinged();
                    self.send(id, ServerMessage::Ping);
                }
            }
        }
    }
}

/// Sweep the hub every `period` until shutdown.
///
/// The first sweep runs one period after start.
pub async fn run_supervisor(hub: SharedHub, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = time::interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                hub.lock().await.sweep();
            }
            // the `watch::Ref` must not outlive this arm
            _ = async { let _ = shutdown.wait_for(|stop| *stop).await; } => break,
        }
    }

    debug!("supervisor stopped");
}
