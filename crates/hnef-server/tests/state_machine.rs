// crates/hnef-server/tests/state_machine.rs
mod common;

use bytes::Bytes;
use common::{addr, connect, game, hub, login, Peer};
use hnef_core::Move;
use hnef_protocol::{Command, ServerMessage};
use hnef_server::router::is_allowed;
use hnef_server::types::{ClientId, Event, Outbound};
use hnef_server::{Hub, State};
use tokio::sync::mpsc;

/// One command of every kind, with its wire form. The subject is always "alice".
fn commands() -> Vec<(&'static str, Command)> {
    vec![
        ("{?}", Command::Ping),
        ("{!}", Command::Pong),
        ("{conn:alice}", Command::Connect("alice".into())),
        ("{conn:zed}", Command::Connect("zed".into())),
        ("{move:03000301}", Command::Move("03000301".parse::<Move>().unwrap())),
        ("{leave}", Command::Leave),
        ("{chat:hi}", Command::Chat("hi".into())),
        ("{exit}", Command::Exit),
    ]
}

/// A hub with "alice" in `state`, plus whoever else that takes.
fn alice_in(state: State, prev: State) -> (Hub, Peer) {
    let mut hub = hub();

    let alice = match (state, prev) {
        (State::New, _) => connect(&mut hub, 1, addr(1)),
        (State::Waiting, _) => login(&mut hub, 1, "alice"),
        (State::PlayingOnTurn, _) => game(&mut hub).0,
        (State::PlayingOnStand, _) => {
            let mut bob = login(&mut hub, 2, "bob");
            let alice = login(&mut hub, 1, "alice");
            hub.matchmake();
            bob.messages();
            alice
        }
        (State::Pinged, prev) | (State::Lost, prev) => {
            let (hub2, alice) = alice_in(prev, State::New);
            hub = hub2;
            hub.sweep();
            if state == State::Lost {
                hub.sweep();
            }
            alice
        }
        (State::Disconnected, _) => unreachable!("a disconnected client cannot send"),
    };

    assert_eq!(alice.state(&hub), Some(state));
    (hub, alice)
}

#[test]
fn dispatch_table() {
    use State::*;
    let mv = Command::Move("03000301".parse::<Move>().unwrap());

    // Liveness and connect are always accepted.
    for state in State::ALL {
        assert!(is_allowed(&Command::Ping, state, New, false));
        assert!(is_allowed(&Command::Pong, state, New, true));
        assert!(is_allowed(&Command::Connect("alice".into()), state, New, true));
    }

    assert!(is_allowed(&mv, PlayingOnTurn, New, true));
    assert!(is_allowed(&mv, Pinged, PlayingOnTurn, true));
    for (state, prev) in [
        (New, New),
        (Waiting, New),
        (PlayingOnStand, PlayingOnTurn),
        (Pinged, PlayingOnStand),
        (Pinged, Waiting),
        (Lost, PlayingOnTurn),
        (Disconnected, PlayingOnTurn),
    ] {
        assert!(!is_allowed(&mv, state, prev, true), "move from {state:?} ({prev:?})");
    }

    for cmd in [Command::Leave, Command::Chat("hi".into())] {
        assert!(is_allowed(&cmd, PlayingOnTurn, New, true));
        assert!(is_allowed(&cmd, PlayingOnStand, New, true));
        assert!(is_allowed(&cmd, Pinged, PlayingOnStand, true));
        assert!(!is_allowed(&cmd, Waiting, New, true));
        assert!(!is_allowed(&cmd, New, New, false));
        assert!(!is_allowed(&cmd, Pinged, Waiting, true));
        assert!(!is_allowed(&cmd, Lost, PlayingOnTurn, true));
    }

    assert!(is_allowed(&Command::Exit, Waiting, New, true));
    assert!(is_allowed(&Command::Exit, Lost, PlayingOnTurn, true));
    assert!(!is_allowed(&Command::Exit, New, New, false));
}

#[test]
fn every_command_in_every_reachable_state_is_handled_or_disconnects() {
    let situations = [
        (State::New, State::New),
        (State::Waiting, State::New),
        (State::PlayingOnTurn, State::New),
        (State::PlayingOnStand, State::New),
        (State::Pinged, State::Waiting),
        (State::Pinged, State::PlayingOnTurn),
        (State::Pinged, State::PlayingOnStand),
        (State::Lost, State::Waiting),
        (State::Lost, State::PlayingOnTurn),
    ];

    for (state, prev) in situations {
        for (wire, command) in commands() {
            let (mut hub, mut alice) = alice_in(state, prev);
            let client = hub.client(alice.id).unwrap();
            let named = !client.name.is_empty();
            let prev_actual = client.state_prev;

            let renaming = named && command == Command::Connect("zed".into());
            let survives = is_allowed(&command, state, prev_actual, named)
                && command != Command::Exit
                && !renaming;

            alice.messages();
            alice.send(&mut hub, wire);

            let label = format!("{wire} in {state:?} (prev {prev:?})");
            assert_eq!(hub.client(alice.id).is_some(), survives, "{label}");
            assert_eq!(alice.closed(), !survives, "{label}");

            if let Some(after) = alice.state(&hub) {
                // Only these edges may leave a state on a client request.
                let legal = match (state, &command) {
                    (_, Command::Ping) => after == state,
                    (State::Pinged | State::Lost, Command::Pong) => after == prev_actual,
                    (_, Command::Pong) => after == state,
                    (State::New, Command::Connect(_)) => after == State::Waiting,
                    (State::Pinged | State::Lost, Command::Connect(_)) => after == prev_actual,
                    (_, Command::Connect(_)) => after == state,
                    (State::PlayingOnTurn, Command::Move(_)) => after == State::PlayingOnStand,
                    (State::Pinged, Command::Move(_)) => after == State::Pinged,
                    (_, Command::Leave) => after == State::Waiting || after == State::Pinged,
                    (_, Command::Chat(_)) => after == state,
                    _ => false,
                };
                assert!(legal, "{label}: ended in {after:?}");
            }
        }
    }
}

#[test]
fn disconnected_records_ignore_late_reads() {
    let mut hub = hub();
    let alice = login(&mut hub, 1, "alice");
    for _ in 0..3 {
        hub.sweep();
    }
    assert_eq!(alice.state(&hub), Some(State::Disconnected));

    alice.send(&mut hub, "{move:03000301}");

    assert_eq!(alice.state(&hub), Some(State::Disconnected));
}

#[test]
fn fresh_connect_enters_the_lobby() {
    let mut hub = hub();
    let mut alice = connect(&mut hub, 1, addr(1));
    assert_eq!(alice.state(&hub), Some(State::New));

    alice.send(&mut hub, "{conn:alice}\r\n");

    assert_eq!(alice.messages(), vec![ServerMessage::ConnectOk, ServerMessage::Lobby]);
    assert_eq!(alice.state(&hub), Some(State::Waiting));
    assert_eq!(hub.registry().find_by_name("alice"), Some(alice.id));
}

#[test]
fn taken_name_is_refused_and_the_newcomer_may_retry() {
    let mut hub = hub();
    let _alice = login(&mut hub, 1, "alice");
    let mut other = connect(&mut hub, 2, addr(2));

    other.send(&mut hub, "{conn:alice}");
    assert_eq!(other.messages(), vec![ServerMessage::NameInUse]);
    assert_eq!(other.state(&hub), Some(State::New));

    other.send(&mut hub, "{conn:carol}");
    assert_eq!(other.messages(), vec![ServerMessage::ConnectOk, ServerMessage::Lobby]);
}

#[test]
fn repeated_connect_from_an_active_client_is_name_in_use() {
    let mut hub = hub();
    let mut alice = login(&mut hub, 1, "alice");

    alice.send(&mut hub, "{conn:alice}");

    assert_eq!(alice.messages(), vec![ServerMessage::NameInUse]);
    assert_eq!(alice.state(&hub), Some(State::Waiting));
}

#[test]
fn connect_under_a_new_name_is_a_violation() {
    let mut hub = hub();
    let mut alice = login(&mut hub, 1, "alice");

    alice.send(&mut hub, "{conn:zed}");

    assert!(hub.client(alice.id).is_none());
    assert!(alice.closed());
    assert_eq!(hub.registry().find_by_name("zed"), None);
}

#[test]
fn violation_stops_the_rest_of_the_read() {
    let mut hub = hub();
    let mut alice = login(&mut hub, 1, "alice");

    alice.send(&mut hub, "{?}{leave}{?}");

    let replies = alice.messages();
    assert_eq!(replies, vec![ServerMessage::Pong]);
    assert!(hub.client(alice.id).is_none());
}

#[test]
fn invalid_or_flooding_reads_disconnect() {
    let mut hub = hub();
    let mut alice = login(&mut hub, 1, "alice");
    alice.send(&mut hub, "{conn:alice}garbage");
    assert!(hub.client(alice.id).is_none());
    assert!(alice.closed());

    let mut bob = login(&mut hub, 2, "bob");
    let flood = "{?}".repeat(400);
    bob.send(&mut hub, &flood);
    assert!(hub.client(bob.id).is_none());
    assert!(bob.closed());
}

#[test]
fn ping_gets_pong_in_any_state() {
    let mut hub = hub();
    let mut new = connect(&mut hub, 1, addr(1));

    new.send(&mut hub, "{?}");

    assert_eq!(new.messages(), vec![ServerMessage::Pong]);
    assert_eq!(new.state(&hub), Some(State::New));
}

#[test]
fn batch_runs_clients_in_registry_order() {
    let mut hub = hub();
    let mut first = connect(&mut hub, 1, addr(1));
    let mut second = connect(&mut hub, 2, addr(2));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let third = ClientId(3);

    // arrival order is the reverse of registry order
    hub.handle_batch(vec![
        Event::Connected { id: third, addr: addr(3), tx },
        Event::Data { id: third, bytes: Bytes::from_static(b"{conn:zed}") },
        Event::Data { id: second.id, bytes: Bytes::from_static(b"{conn:zed}") },
        Event::Data { id: first.id, bytes: Bytes::from_static(b"{conn:zed}") },
    ]);

    assert_eq!(first.messages(), vec![ServerMessage::ConnectOk, ServerMessage::Lobby]);
    assert_eq!(second.messages(), vec![ServerMessage::NameInUse]);
    assert_eq!(rx.try_recv(), Ok(Outbound::Frame(ServerMessage::NameInUse.encode())));
    assert_eq!(hub.registry().find_by_name("zed"), Some(first.id));
    assert_eq!(hub.registry().position(third), Some(2));
}
