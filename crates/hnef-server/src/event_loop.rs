//! Central event loop.
//!
//! Waits for the next transport event, then takes the hub lock and
//! processes that event plus everything already queued behind it as
//! one batch, in registry order. Matchmaking runs once per batch.

use tokio::sync::watch;
use tracing::{debug, info};

use crate::hub::SharedHub;
use crate::types::EventRx;

/// Run the event loop until shutdown, then close every client.
///
/// - `events`: receives transport events from all connection tasks.
/// - `shutdown`: flips to `true` when the server should stop.
pub async fn run_event_loop(hub: SharedHub, mut events: EventRx, mut shutdown: watch::Receiver<bool>) {
    loop {
        let first = tokio::select! {
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
            _ = shutdown.wait_for(|stop| *stop) => break,
        };

        let mut batch = vec![first];
        while let Ok(event) = events.try_recv() {
            batch.push(event);
        }
        debug!(batch = batch.len(), "processing events");

        hub.lock().await.handle_batch(batch);
    }

    hub.lock().await.shutdown();
    info!("event loop stopped");
}
