//! Hnefatafl TCP server binary.
//!
//! # Usage
//!
//! ```bash
//! # defaults, overridable through HNEF_* environment variables
//! hnef-server
//!
//! # listen on all interfaces, port 10001, at most 20 clients in 10 rooms
//! hnef-server -a 0.0.0.0 -p 10001 -c 20 -r 10
//! ```

use std::net::Ipv4Addr;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hnef_server::config::Config;
use hnef_server::server;

/// Hnefatafl session server
#[derive(Parser, Debug)]
#[command(name = "hnef-server")]
#[command(about = "Multiplayer Hnefatafl server over TCP")]
#[command(version)]
struct Args {
    /// IPv4 address to bind to
    #[arg(short = 'a', long = "addr")]
    addr: Option<Ipv4Addr>,

    /// Port to listen on
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1024..=49151))]
    port: Option<u16>,

    /// Maximum number of clients
    #[arg(short = 'c', long = "clients", value_parser = clap::value_parser!(u64).range(2..=20))]
    clients: Option<u64>,

    /// Maximum number of game rooms
    #[arg(short = 'r', long = "rooms", value_parser = clap::value_parser!(u64).range(1..=10))]
    rooms: Option<u64>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Flags win over the environment.
    fn apply(&self, config: &mut Config) {
        if let Some(addr) = self.addr {
            config.bind_addr = addr;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(clients) = self.clients {
            config.max_clients = clients as usize;
        }
        if let Some(rooms) = self.rooms {
            config.max_rooms = rooms as usize;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let mut config = Config::from_env()?;
    args.apply(&mut config);
    config.validate()?;

    info!(
        addr = %config.bind_addr,
        port = config.port,
        max_clients = config.max_clients,
        max_rooms = config.max_rooms,
        ping_period_ms = config.ping_period.as_millis() as u64,
        decay_budget = config.decay_budget,
        "starting hnef-server"
    );

    let listener = server::bind(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, shutting down");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!(error = %e, "cannot listen for ctrl-c");
                // keep the sender alive so the server keeps running
                std::future::pending::<()>().await;
            }
        }
    });

    let stats = server::run(config, listener, shutdown_rx).await?;
    stats.log();

    Ok(())
}
