//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Binds the configured address/port.
//! - Spawns the event loop and the liveness supervisor, sharing one hub.
//! - Accepts connections, assigns each a `ClientId` and spawns its I/O task.
//! - On shutdown (or a failing listener) stops everything in order and
//!   hands back the final statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::Config;
use crate::connection;
use crate::event_loop;
use crate::hub::Hub;
use crate::stats::Stats;
use crate::supervisor;
use crate::types::{ClientId, Event, EventRx, EventTx, OutboundRx, OutboundTx};

/// How long connection tasks get to flush their last frames on shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Counter for assigning unique `ClientId`s.
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_client_id() -> ClientId {
    ClientId(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Bind the listening socket for `config`.
pub async fn bind(config: &Config) -> anyhow::Result<TcpListener> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("unable to listen on {addr}"))?;
    info!(%addr, "listening");
    Ok(listener)
}

/// Serve clients on `listener` until `shutdown` turns `true`.
///
/// An accept error is fatal: every client is told and closed first,
/// then the error is returned.
pub async fn run(
    config: Config,
    listener: TcpListener,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<Stats> {
    let hub = Hub::shared(&config);

    // Internal stop signal, so a failing listener can stop the tasks too.
    let (stop_tx, stop_rx) = watch::channel(false);

    // Channel from connection tasks → event loop.
    let (event_tx, event_rx): (EventTx, EventRx) = mpsc::unbounded_channel();

    let event_loop = tokio::spawn(event_loop::run_event_loop(hub.clone(), event_rx, stop_rx.clone()));
    let supervisor = tokio::spawn(supervisor::run_supervisor(
        hub.clone(),
        config.ping_period,
        stop_rx,
    ));

    let mut connections = JoinSet::new();

    let outcome: std::io::Result<()> = loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => break Err(e),
                };

                let id = next_client_id();
                let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();

                // Registered before the I/O task can report anything.
                let _ = event_tx.send(Event::Connected { id, addr: peer_addr.ip(), tx: out_tx });
                connections.spawn(connection::run_connection(id, stream, event_tx.clone(), out_rx));
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            _ = shutdown.wait_for(|stop| *stop) => break Ok(()),
        }
    };

    if let Err(e) = &outcome {
        error!(error = %e, "accept failed, shutting down");
    }

    let _ = stop_tx.send(true);
    drop(event_tx);
    let _ = event_loop.await;
    let _ = supervisor.await;

    // Give connection tasks a moment to write the shutdown notice.
    let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        connections.abort_all();
    }

    let stats = hub.lock().await.stats().clone();
    info!("server stopped");

    outcome.context("accepting connections failed")?;
    Ok(stats)
}
