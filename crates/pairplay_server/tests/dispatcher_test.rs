//! Scenario tests for matchmaking, move routing, and teardown.

use pairplay_server::{
    ClientMessage, ConnectionId, Dispatcher, GameError, MoveRejection, MoveStatus, ServerMessage,
    SessionId, Symbol, Winner,
};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

struct Client {
    id: ConnectionId,
    rx: UnboundedReceiver<ServerMessage>,
}

impl Client {
    fn connect(dispatcher: &mut Dispatcher, name: &str) -> Self {
        let id = ConnectionId::from(name);
        let (tx, rx) = unbounded_channel();
        dispatcher.connect(id.clone(), tx);
        Self { id, rx }
    }

    fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}

/// Connects two clients and returns them with their session id.
fn paired(dispatcher: &mut Dispatcher) -> (Client, Client, SessionId) {
    let mut x = Client::connect(dispatcher, "x");
    let mut o = Client::connect(dispatcher, "o");
    let session_id = dispatcher.session_of(&x.id).cloned().expect("paired");
    x.drain();
    o.drain();
    (x, o, session_id)
}

#[test]
fn test_first_connection_gets_waiting() {
    let mut dispatcher = Dispatcher::new();
    let mut alice = Client::connect(&mut dispatcher, "alice");
    assert!(matches!(alice.drain().as_slice(), [ServerMessage::Waiting { .. }]));
    assert_eq!(dispatcher.waiting(), vec![alice.id.clone()]);
    assert_eq!(dispatcher.session_of(&alice.id), None);
}

#[test]
fn test_pairing_sends_game_start_to_both() {
    let mut dispatcher = Dispatcher::new();
    let mut alice = Client::connect(&mut dispatcher, "alice");
    let mut bob = Client::connect(&mut dispatcher, "bob");

    let session_id = dispatcher.session_of(&alice.id).cloned().expect("alice paired");
    assert_eq!(dispatcher.session_of(&bob.id), Some(&session_id));
    assert!(dispatcher.waiting().is_empty());

    let alice_msgs = alice.drain();
    assert!(matches!(alice_msgs.first(), Some(ServerMessage::Waiting { .. })));
    assert_eq!(
        alice_msgs.get(1),
        Some(&ServerMessage::GameStart {
            session_id: session_id.clone(),
            symbol: Symbol::X,
            opponent_id: bob.id.clone(),
        })
    );
    assert_eq!(
        bob.drain(),
        vec![ServerMessage::GameStart {
            session_id,
            symbol: Symbol::O,
            opponent_id: alice.id.clone(),
        }]
    );
}

#[test]
fn test_pairing_is_fifo() {
    let mut dispatcher = Dispatcher::new();
    let clients: Vec<_> = ["c1", "c2", "c3", "c4"]
        .into_iter()
        .map(|name| Client::connect(&mut dispatcher, name))
        .collect();

    let session = |i: usize| dispatcher.session_of(&clients[i].id).cloned();
    assert_eq!(session(0), session(1));
    assert_eq!(session(2), session(3));
    assert_ne!(session(0), session(2));
    assert_eq!(dispatcher.active_sessions(), 2);

    let first = dispatcher.session(&session(0).unwrap()).unwrap();
    assert_eq!(first.symbol_of(&clients[0].id), Some(Symbol::X));
    assert_eq!(first.symbol_of(&clients[1].id), Some(Symbol::O));
}

#[test]
fn test_accepted_move_updates_both() {
    let mut dispatcher = Dispatcher::new();
    let (mut x, mut o, session_id) = paired(&mut dispatcher);

    let result = dispatcher.make_move(&x.id, &session_id, 4).expect("legal move");
    assert_eq!(result.status(), &MoveStatus::InProgress);

    let x_msgs = x.drain();
    let o_msgs = o.drain();
    assert_eq!(x_msgs, o_msgs);
    let [ServerMessage::UpdateBoard { board, .. }] = x_msgs.as_slice() else {
        panic!("expected one update_board, got {:?}", x_msgs);
    };
    assert_eq!(board.cells()[4], Some(Symbol::X));
    assert_eq!(
        dispatcher.session(&session_id).unwrap().current_turn(),
        &o.id
    );
}

#[test]
fn test_out_of_turn_move_notifies_only_mover() {
    let mut dispatcher = Dispatcher::new();
    let (mut x, mut o, session_id) = paired(&mut dispatcher);

    for _ in 0..2 {
        let err = dispatcher.make_move(&o.id, &session_id, 0).unwrap_err();
        assert_eq!(err, GameError::InvalidGameState(MoveRejection::NotYourTurn));
    }

    assert!(matches!(
        o.drain().as_slice(),
        [ServerMessage::Error { .. }, ServerMessage::Error { .. }]
    ));
    assert!(x.drain().is_empty());
    assert_eq!(*dispatcher.session(&session_id).unwrap().move_count(), 0);
}

#[test]
fn test_occupied_cell_rejected() {
    let mut dispatcher = Dispatcher::new();
    let (mut x, mut o, session_id) = paired(&mut dispatcher);
    dispatcher.make_move(&x.id, &session_id, 0).unwrap();
    x.drain();
    o.drain();

    let err = dispatcher.make_move(&o.id, &session_id, 0).unwrap_err();
    assert_eq!(err, GameError::InvalidGameState(MoveRejection::CellOccupied(0)));
    assert!(matches!(o.drain().as_slice(), [ServerMessage::Error { .. }]));
    assert!(x.drain().is_empty());
}

#[test]
fn test_row_win_ends_session() {
    let mut dispatcher = Dispatcher::new();
    let (mut x, mut o, session_id) = paired(&mut dispatcher);

    for (who, cell) in [(&x.id, 0), (&o.id, 3), (&x.id, 1), (&o.id, 4)] {
        dispatcher.make_move(who, &session_id, cell).unwrap();
    }
    let result = dispatcher.make_move(&x.id, &session_id, 2).unwrap();
    assert_eq!(result.status(), &MoveStatus::Winner(Symbol::X));

    let game_over = ServerMessage::GameOver {
        session_id: session_id.clone(),
        winner: Winner::X,
    };
    assert_eq!(x.drain().last(), Some(&game_over));
    assert_eq!(o.drain().last(), Some(&game_over));

    assert!(dispatcher.session(&session_id).is_none());
    assert_eq!(dispatcher.session_of(&x.id), None);
    assert_eq!(dispatcher.session_of(&o.id), None);
    assert_eq!(dispatcher.active_sessions(), 0);
}

#[test]
fn test_full_board_is_draw() {
    let mut dispatcher = Dispatcher::new();
    let (mut x, mut o, session_id) = paired(&mut dispatcher);

    // X O X / X O O / O X X
    let moves = [
        (&x.id, 0),
        (&o.id, 1),
        (&x.id, 2),
        (&o.id, 4),
        (&x.id, 3),
        (&o.id, 5),
        (&x.id, 7),
        (&o.id, 6),
        (&x.id, 8),
    ];
    let mut last = None;
    for (who, cell) in moves {
        last = Some(dispatcher.make_move(who, &session_id, cell).unwrap());
    }
    assert_eq!(last.map(|r| *r.status()), Some(MoveStatus::Draw));

    let game_over = ServerMessage::GameOver {
        session_id,
        winner: Winner::Draw,
    };
    assert_eq!(x.drain().last(), Some(&game_over));
    assert_eq!(o.drain().last(), Some(&game_over));
    assert_eq!(dispatcher.active_sessions(), 0);
}

#[test]
fn test_disconnect_before_any_move() {
    let mut dispatcher = Dispatcher::new();
    let (x, mut o, session_id) = paired(&mut dispatcher);

    assert_eq!(dispatcher.disconnect(&x.id), Some(session_id.clone()));
    assert_eq!(
        o.drain(),
        vec![ServerMessage::GameOver {
            session_id: session_id.clone(),
            winner: Winner::OpponentDisconnected,
        }]
    );
    assert_eq!(dispatcher.session_of(&x.id), None);
    assert_eq!(dispatcher.session_of(&o.id), None);

    let err = dispatcher.make_move(&x.id, &session_id, 0).unwrap_err();
    assert_eq!(err, GameError::NoSuchSession(session_id.clone()));
    let err = dispatcher.make_move(&o.id, &session_id, 0).unwrap_err();
    assert_eq!(err, GameError::NoSuchSession(session_id));
}

#[test]
fn test_unknown_session_yields_error_without_mutation() {
    let mut dispatcher = Dispatcher::new();
    let (mut x, mut o, session_id) = paired(&mut dispatcher);
    let bogus = SessionId::from("no-such-game");

    let err = dispatcher.make_move(&x.id, &bogus, 4).unwrap_err();
    assert_eq!(err, GameError::NoSuchSession(bogus));
    assert!(matches!(x.drain().as_slice(), [ServerMessage::Error { .. }]));
    assert!(o.drain().is_empty());

    let session = dispatcher.session(&session_id).unwrap();
    assert_eq!(*session.move_count(), 0);
    assert_eq!(session.current_turn(), &x.id);
}

#[test]
fn test_move_into_foreign_session_rejected() {
    let mut dispatcher = Dispatcher::new();
    let (mut a, _b, first) = paired(&mut dispatcher);
    let mut c = Client::connect(&mut dispatcher, "c");
    let _d = Client::connect(&mut dispatcher, "d");
    let second = dispatcher.session_of(&c.id).cloned().unwrap();
    c.drain();

    let err = dispatcher.make_move(&c.id, &first, 0).unwrap_err();
    assert_eq!(err, GameError::NoSuchSession(first.clone()));
    assert!(a.drain().is_empty());
    assert_eq!(*dispatcher.session(&first).unwrap().move_count(), 0);
    assert_eq!(*dispatcher.session(&second).unwrap().move_count(), 0);
}

#[test]
fn test_waiting_disconnect_purges_pool() {
    let mut dispatcher = Dispatcher::new();
    let alice = Client::connect(&mut dispatcher, "alice");
    assert_eq!(dispatcher.disconnect(&alice.id), None);
    assert!(dispatcher.waiting().is_empty());

    let mut bob = Client::connect(&mut dispatcher, "bob");
    assert!(matches!(bob.drain().as_slice(), [ServerMessage::Waiting { .. }]));
    assert_eq!(dispatcher.active_sessions(), 0);
}

#[test]
fn test_handle_routes_make_move() {
    let mut dispatcher = Dispatcher::new();
    let (mut x, o, session_id) = paired(&mut dispatcher);

    let message = ClientMessage::MakeMove {
        session_id: session_id.clone(),
        cell_index: 8,
    };
    dispatcher.handle(&x.id, message).expect("legal move");
    assert!(matches!(x.drain().as_slice(), [ServerMessage::UpdateBoard { .. }]));

    let out_of_range = ClientMessage::MakeMove {
        session_id,
        cell_index: 9,
    };
    assert_eq!(
        dispatcher.handle(&o.id, out_of_range),
        Err(GameError::InvalidGameState(MoveRejection::OutOfRange(9)))
    );
}

#[test]
fn test_closed_outbox_does_not_abort_move() {
    let mut dispatcher = Dispatcher::new();
    let (x, o, session_id) = paired(&mut dispatcher);
    drop(o);

    let result = dispatcher.make_move(&x.id, &session_id, 4);
    assert!(result.is_ok());
    assert_eq!(*dispatcher.session(&session_id).unwrap().move_count(), 1);
}

#[test]
fn test_stats() {
    let mut dispatcher = Dispatcher::new();
    let _pair = paired(&mut dispatcher);
    let _waiting = Client::connect(&mut dispatcher, "late");

    let stats = dispatcher.stats();
    assert_eq!(*stats.connections(), 3);
    assert_eq!(*stats.waiting(), 1);
    assert_eq!(*stats.sessions(), 1);
}
