// crates/hnef-server/tests/connection.rs
use std::time::Duration;

use hnef_core::Board;
use hnef_protocol::ServerMessage;
use hnef_server::connection::run_connection;
use hnef_server::types::{ClientId, Event, Outbound};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(10);

/// A connected pair: the client end and the server end.
async fn pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
    let (server, _) = listener.accept().await.unwrap();
    (client, server)
}

#[tokio::test]
async fn frames_are_written_in_order_and_close_ends_quietly() {
    let (mut client, server) = pair().await;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_connection(ClientId(1), server, event_tx, out_rx));

    out_tx.send(Outbound::Frame(ServerMessage::ConnectOk.encode())).unwrap();
    out_tx.send(Outbound::Frame(ServerMessage::Lobby.encode())).unwrap();
    out_tx.send(Outbound::Close).unwrap();

    let mut seen = String::new();
    timeout(WAIT, client.read_to_string(&mut seen)).await.unwrap().unwrap();
    assert_eq!(seen, "{conn_ok}{lobby}");

    timeout(WAIT, task).await.unwrap().unwrap();
    assert!(event_rx.try_recv().is_err());
}

#[tokio::test]
async fn peer_that_never_reads_fails_the_write_instead_of_blocking() {
    // held open but never read from
    let (_client, server) = pair().await;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let id = ClientId(7);
    let task = tokio::spawn(run_connection(id, server, event_tx, out_rx));

    // far more than the socket buffers hold
    let frame = ServerMessage::Playfield(Board::new().playfield_string()).encode();
    for _ in 0..200_000 {
        out_tx.send(Outbound::Frame(frame.clone())).unwrap();
    }
    out_tx.send(Outbound::Close).unwrap();

    let event = timeout(WAIT, event_rx.recv())
        .await
        .expect("writer gave up in time")
        .expect("an event was reported");
    assert!(matches!(event, Event::WriteFailed { id: failed } if failed == id));

    timeout(WAIT, task).await.expect("task finished").unwrap();
}
