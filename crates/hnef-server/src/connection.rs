//! Per-connection I/O task.
//!
//! Forwards whatever the socket delivers to the event loop and writes
//! whatever the hub queues for this connection. It keeps no session
//! state of its own.

use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::time;
use tracing::debug;

use hnef_protocol::wire_types::RECV_BUFFER_LEN;

use crate::types::{ClientId, Event, EventTx, Outbound, OutboundRx};

/// Attempts per outbound frame before the write counts as failed.
pub const WRITE_ATTEMPTS: usize = 3;

/// How long one attempt may wait for a peer that is not reading.
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Run the I/O loop for a single connection.
///
/// Each read becomes one `Event::Data`. EOF or a read error ends the
/// loop with `Event::Closed`; a frame that cannot be written ends it
/// with `Event::WriteFailed`. `Outbound::Close` ends it quietly.
pub async fn run_connection(id: ClientId, stream: TcpStream, events: EventTx, mut out_rx: OutboundRx) {
    let (mut reader, mut writer) = stream.into_split();
    let mut buf = BytesMut::with_capacity(RECV_BUFFER_LEN);

    loop {
        buf.reserve(RECV_BUFFER_LEN);

        tokio::select! {
            read = reader.read_buf(&mut buf) => match read {
                Ok(0) => {
                    debug!(client = %id, "peer closed");
                    let _ = events.send(Event::Closed { id });
                    break;
                }
                Ok(_) => {
                    let bytes = buf.split().freeze();
                    if events.send(Event::Data { id, bytes }).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(client = %id, error = %e, "read error");
                    let _ = events.send(Event::Closed { id });
                    break;
                }
            },
            out = out_rx.recv() => match out {
                Some(Outbound::Frame(frame)) => {
                    if let Err(e) = write_frame(&mut writer, frame.as_bytes()).await {
                        debug!(client = %id, error = %e, "write failed");
                        let _ = events.send(Event::WriteFailed { id });
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = writer.shutdown().await;
                    debug!(client = %id, "transport closed");
                    break;
                }
            },
        }
    }
}

/// Write one frame, retrying a bounded number of times.
///
/// Each attempt has a deadline and picks up after the bytes already
/// written, so a retry never repeats part of a frame.
async fn write_frame(writer: &mut OwnedWriteHalf, frame: &[u8]) -> io::Result<()> {
    let mut written = 0;
    let mut last_error = None;

    for attempt in 1..=WRITE_ATTEMPTS {
        match time::timeout(WRITE_TIMEOUT, write_rest(writer, frame, &mut written)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => {
                debug!(attempt, written, error = %e, "write attempt failed");
                last_error = Some(e);
            }
            Err(_) => {
                debug!(attempt, written, "write attempt timed out");
                last_error = Some(io::Error::new(io::ErrorKind::TimedOut, "peer is not reading"));
            }
        }
    }

    Err(last_error.unwrap_or_else(|| io::Error::new(io::ErrorKind::WriteZero, "frame not written")))
}

/// Write `frame[*written..]`, advancing `written` as bytes go out.
async fn write_rest(writer: &mut OwnedWriteHalf, frame: &[u8], written: &mut usize) -> io::Result<()> {
    while *written < frame.len() {
        let n = writer.write(&frame[*written..]).await?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "peer closed while writing"));
        }
        *written += n;
    }
    Ok(())
}
