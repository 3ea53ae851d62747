//! End-to-end properties of the client against a real rules oracle.
//!
//! The relay is played by hand: requests are answered by building the reply
//! frame the relay would send.

use std::{cell::Cell, time::Instant};

use kingside_client::{
    Client, ClientAction, ClientConfig, ClientError, ClientEvent, Environment, InputState,
    OPPONENT_JOINED_NOTICE, SessionStatus,
};
use kingside_core::{
    BoardSnapshot, Color, LegalMove, Move, Oracle, OracleError, Outcome, PlayerInfo, Square,
    TerminalKind,
};
use kingside_proto::{Ack, EventName, Frame, FrameKind, RemoteMove};
use kingside_rules::ShakmatyOracle;
use proptest::prelude::*;

#[derive(Clone)]
struct TestEnv;

impl Environment for TestEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(7);
    }
}

/// Wraps an oracle and counts `apply` calls.
struct Counting<O> {
    inner: O,
    applies: Cell<usize>,
}

impl<O> Counting<O> {
    fn new(inner: O) -> Self {
        Self { inner, applies: Cell::new(0) }
    }
}

impl<O: Oracle> Oracle for Counting<O> {
    fn legal_moves(&self, from: Square) -> Vec<LegalMove> {
        self.inner.legal_moves(from)
    }

    fn apply(&mut self, mv: &Move) -> Result<(), OracleError> {
        self.applies.set(self.applies.get() + 1);
        self.inner.apply(mv)
    }

    fn side_to_move(&self) -> Color {
        self.inner.side_to_move()
    }

    fn is_checkmate(&self) -> bool {
        self.inner.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.inner.is_stalemate()
    }

    fn is_insufficient_material(&self) -> bool {
        self.inner.is_insufficient_material()
    }

    fn is_threefold_repetition(&self) -> bool {
        self.inner.is_threefold_repetition()
    }

    fn snapshot(&self) -> BoardSnapshot {
        self.inner.snapshot()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

type TestClient = Client<Counting<ShakmatyOracle>, TestEnv>;

fn client_with(oracle: ShakmatyOracle) -> TestClient {
    let mut client = Client::new(TestEnv, Counting::new(oracle), &ClientConfig::default());
    client.handle(ClientEvent::Connected).unwrap();
    client
}

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn mv(from: &str, to: &str) -> Move {
    Move::new(sq(from), sq(to))
}

fn press(client: &mut TestClient, square: Square) -> Vec<ClientAction> {
    let (x, y) = client.input().geometry().centre_of(square);
    client.handle(ClientEvent::PointerDown { x, y }).unwrap()
}

fn release(client: &mut TestClient, square: Square) -> Vec<ClientAction> {
    let (x, y) = client.input().geometry().centre_of(square);
    client.handle(ClientEvent::PointerMove { x, y }).unwrap();
    client.handle(ClientEvent::PointerUp { x, y }).unwrap()
}

fn sent(actions: &[ClientAction]) -> Vec<Frame> {
    actions
        .iter()
        .filter_map(|a| match a {
            ClientAction::Send(frame) => Some(frame.clone()),
            _ => None,
        })
        .collect()
}

fn request_id(frame: &Frame) -> u64 {
    match frame.kind {
        FrameKind::Request { request_id, .. } => request_id,
        other => panic!("expected request, got {other:?}"),
    }
}

/// Host a room and let an opponent of the other color arrive.
fn start_hosted_game(client: &mut TestClient, color: Color) {
    let actions = client
        .handle(ClientEvent::CreateGame { color, name: "alice".to_string() })
        .unwrap();
    let reply = Frame::reply(request_id(&sent(&actions)[0]), &Ack::ok("ROOM01".to_string())).unwrap();
    client.handle(ClientEvent::FrameReceived(reply)).unwrap();

    let bob = PlayerInfo { name: "bob".to_string(), color: color.opposite() };
    let joined = Frame::event(EventName::OpponentConnected, &bob).unwrap();
    client.handle(ClientEvent::FrameReceived(joined)).unwrap();
}

fn receive_move(client: &mut TestClient, m: Move) -> Vec<ClientAction> {
    let frame = Frame::event(EventName::MakeMove, &RemoteMove { mv: m }).unwrap();
    client.handle(ClientEvent::FrameReceived(frame)).unwrap()
}

fn highlights(actions: &[ClientAction]) -> Vec<Square> {
    actions
        .iter()
        .find_map(|a| match a {
            ClientAction::Highlight(squares) => Some(squares.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

#[test]
fn completed_move_applies_once_and_flips_side() {
    let mut client = client_with(ShakmatyOracle::new());

    press(&mut client, sq("g1"));
    assert_eq!(client.oracle().applies.get(), 0);
    let actions = release(&mut client, sq("f3"));

    assert_eq!(client.oracle().applies.get(), 1);
    let view = actions
        .iter()
        .find_map(|a| match a {
            ClientAction::Render(view) => Some(view.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(view.side_to_move, Color::Black);
}

#[test]
fn illegal_drop_never_reaches_the_oracle() {
    let mut client = client_with(ShakmatyOracle::new());

    press(&mut client, sq("g1"));
    let actions = release(&mut client, sq("g3"));

    assert_eq!(client.oracle().applies.get(), 0);
    assert!(actions.contains(&ClientAction::ReturnPiece { origin: sq("g1") }));
    assert_eq!(client.input().state(), &InputState::Idle);
}

#[test]
fn promotion_prompt_comes_before_apply() {
    let mut client = client_with(ShakmatyOracle::from_fen("8/1P6/8/8/8/8/8/k6K w - - 0 1").unwrap());

    press(&mut client, sq("b7"));
    let actions = release(&mut client, sq("b8"));

    assert_eq!(client.oracle().applies.get(), 0);
    assert!(actions.contains(&ClientAction::PromptPromotion { square: sq("b8"), color: Color::White }));
    assert!(matches!(client.input().state(), InputState::AwaitingPromotion(_)));

    client
        .handle(ClientEvent::ChoosePromotion(kingside_core::PromotionPiece::Knight))
        .unwrap();
    assert_eq!(client.oracle().applies.get(), 1);
    assert!(client.board().piece_at(sq("b8")).is_some());
}

#[test]
fn sandbox_checkmate_is_reported_as_checkmate() {
    let mut client = client_with(ShakmatyOracle::new());

    for m in [mv("f2", "f3"), mv("e7", "e5"), mv("g2", "g4")] {
        client.handle(ClientEvent::PlayMove(m)).unwrap();
    }
    let actions = client.handle(ClientEvent::PlayMove(mv("d8", "h4"))).unwrap();

    let result = actions
        .iter()
        .find_map(|a| match a {
            ClientAction::GameOver(result) => Some(*result),
            _ => None,
        })
        .unwrap();
    assert_eq!(result.kind, TerminalKind::Checkmate);
    // Sandbox perspective is white's.
    assert_eq!(result.outcome, Outcome::Lose);

    // Board is locked until the session is left.
    assert!(press(&mut client, sq("a2")).is_empty());
    client.handle(ClientEvent::LeaveGame).unwrap();
    assert_eq!(client.session().status(), &SessionStatus::Idle);
    assert_eq!(client.board().pieces.len(), 32);
}

#[test]
fn create_then_immediately_leave_is_idle_defaults() {
    let mut client = client_with(ShakmatyOracle::new());

    let create = client
        .handle(ClientEvent::CreateGame { color: Color::Black, name: "alice".to_string() })
        .unwrap();
    client.handle(ClientEvent::LeaveGame).unwrap();

    // The create reply arriving after leave changes nothing.
    let reply = Frame::reply(request_id(&sent(&create)[0]), &Ack::ok("ROOM01".to_string())).unwrap();
    assert!(client.handle(ClientEvent::FrameReceived(reply)).unwrap().is_empty());

    let session = client.session();
    assert_eq!(session.status(), &SessionStatus::Idle);
    assert_eq!(session.room_id(), None);
    assert!(session.opponent().is_none());
    assert_eq!(session.local_color(), Color::White);
    assert_eq!(session.pending_request(), None);
}

#[test]
fn joiner_plays_the_other_color() {
    let mut host = client_with(ShakmatyOracle::new());
    let mut guest = client_with(ShakmatyOracle::new());

    let create = host
        .handle(ClientEvent::CreateGame { color: Color::White, name: "alice".to_string() })
        .unwrap();
    let reply = Frame::reply(request_id(&sent(&create)[0]), &Ack::ok("ROOM01".to_string())).unwrap();
    host.handle(ClientEvent::FrameReceived(reply)).unwrap();

    let join = guest
        .handle(ClientEvent::JoinGame { room_id: "ROOM01".to_string(), name: "bob".to_string() })
        .unwrap();
    let host_info = PlayerInfo { name: "alice".to_string(), color: Color::White };
    let reply = Frame::reply(request_id(&sent(&join)[0]), &Ack::ok(host_info)).unwrap();
    guest.handle(ClientEvent::FrameReceived(reply)).unwrap();

    assert_eq!(guest.session().local_color(), Color::Black);
    assert_eq!(guest.session().status(), &SessionStatus::InProgress);

    let bob = PlayerInfo { name: "bob".to_string(), color: Color::Black };
    let joined = Frame::event(EventName::OpponentConnected, &bob).unwrap();
    host.handle(ClientEvent::FrameReceived(joined.clone())).unwrap();
    assert_eq!(host.session().status(), &SessionStatus::InProgress);
    assert_eq!(host.notices().len(), 1);
    assert_eq!(host.notices()[0].id.as_deref(), Some(OPPONENT_JOINED_NOTICE));

    // A repeated join event does not notify twice.
    host.handle(ClientEvent::FrameReceived(joined)).unwrap();
    assert_eq!(host.notices().len(), 1);
}

#[test]
fn turns_alternate_between_local_and_remote() {
    let mut client = client_with(ShakmatyOracle::new());
    start_hosted_game(&mut client, Color::White);

    let actions = client.handle(ClientEvent::PlayMove(mv("e2", "e4"))).unwrap();
    assert_eq!(sent(&actions).len(), 1);
    assert_eq!(client.board().side_to_move, Color::Black);

    let err = client.handle(ClientEvent::PlayMove(mv("d2", "d4"))).unwrap_err();
    assert_eq!(err, ClientError::NotYourTurn);
    assert!(!err.is_fatal());
    assert_eq!(client.oracle().applies.get(), 1);

    // Pointer input cannot pick up white pieces either.
    assert!(press(&mut client, sq("d2")).is_empty());

    receive_move(&mut client, mv("e7", "e5"));
    assert_eq!(client.board().side_to_move, Color::White);
    assert!(client.handle(ClientEvent::PlayMove(mv("d2", "d4"))).is_ok());
}

#[test]
fn out_of_turn_remote_move_is_discarded() {
    let mut client = client_with(ShakmatyOracle::new());
    start_hosted_game(&mut client, Color::Black);

    // Black may not pick up while white is to move.
    assert!(press(&mut client, sq("e7")).is_empty());

    receive_move(&mut client, mv("e2", "e4"));
    press(&mut client, sq("e7"));
    assert!(matches!(client.input().state(), InputState::Dragging(_)));

    // A second white move in a row is dropped and the drag stays open.
    assert!(receive_move(&mut client, mv("d2", "d4")).is_empty());
    assert!(matches!(client.input().state(), InputState::Dragging(_)));
    assert_eq!(client.board().side_to_move, Color::Black);
}

#[test]
fn entering_a_session_cancels_a_sandbox_drag() {
    let mut client = client_with(ShakmatyOracle::new());
    let join = client
        .handle(ClientEvent::JoinGame { room_id: "ROOM01".to_string(), name: "bob".to_string() })
        .unwrap();

    press(&mut client, sq("e2"));
    assert!(matches!(client.input().state(), InputState::Dragging(_)));

    let host = PlayerInfo { name: "alice".to_string(), color: Color::Black };
    let reply = Frame::reply(request_id(&sent(&join)[0]), &Ack::ok(host)).unwrap();
    let actions = client.handle(ClientEvent::FrameReceived(reply)).unwrap();

    assert!(actions.contains(&ClientAction::ReturnPiece { origin: sq("e2") }));
    assert_eq!(client.input().state(), &InputState::Idle);
    assert_eq!(client.session().local_color(), Color::White);
}

#[test]
fn leaving_unregisters_session_subscribers() {
    let mut client = client_with(ShakmatyOracle::new());
    start_hosted_game(&mut client, Color::White);
    assert_eq!(client.session().subscriber_count(EventName::MakeMove), 1);

    let actions = client.handle(ClientEvent::LeaveGame).unwrap();
    assert_eq!(sent(&actions)[0].name(), Some(EventName::LeaveGame));
    assert_eq!(client.session().subscriber_count(EventName::MakeMove), 0);

    // Moves for the old room no longer reach the oracle.
    let applies = client.oracle().applies.get();
    assert!(receive_move(&mut client, mv("e7", "e5")).is_empty());
    assert_eq!(client.oracle().applies.get(), applies);
}

proptest! {
    #[test]
    fn squares_without_moves_never_get_targets(file in 0u8..8, rank in 0u8..8) {
        let mut client = client_with(ShakmatyOracle::new());
        let square = Square::new(file, rank).unwrap();
        let legal = client.oracle().legal_moves(square);

        let actions = press(&mut client, square);

        if legal.is_empty() {
            prop_assert!(highlights(&actions).is_empty());
        } else {
            let targets = highlights(&actions);
            prop_assert!(targets.iter().all(|t| legal.iter().any(|l| l.to == *t)));
        }
    }
}
