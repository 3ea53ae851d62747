//! Game session lifecycle and move relay.
//!
//! ```text
//!   Idle ──create ack──▶ Hosting(room) ──opponent-connected──▶ InProgress ──terminal──▶ Ended
//!     │                                                           ▲
//!     └───────────────────────────join ack────────────────────────┘
//!   any state ──leave──▶ Idle
//! ```
//!
//! Local moves are applied to the oracle first and relayed afterwards. A relay
//! failure is reported but never rolled back. Remote moves are applied in the
//! order they arrive.
//!
//! Every create/join acknowledgement carries the session generation it was
//! sent in. Leaving bumps the generation, so a reply that arrives afterwards
//! finds a mismatch and is dropped without touching state.

use kingside_core::{Color, GameResult, Move, Oracle, PlayerInfo, terminal};
use kingside_proto::{
    Ack, CreateGame, Empty, EventName, Frame, FrameKind, JoinGame, LeaveGame, MakeMove, RemoteMove,
    RoomId,
};

use crate::{
    channel::{SubscriptionId, SyncChannel},
    error::ClientError,
    input::InteractionMode,
    notice::NoticeKind,
};

/// Notice id for the opponent arriving.
pub const OPPONENT_JOINED_NOTICE: &str = "opponent-joined";

/// Notice id for the transport going down.
pub const CONNECTION_LOST_NOTICE: &str = "connection-lost";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No game. The board is a local sandbox.
    Idle,
    /// Room created, waiting for an opponent.
    Hosting(RoomId),
    /// Both players present.
    InProgress,
    /// A terminal position was reached.
    Ended(GameResult),
}

/// Subscriber registered with the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handler {
    Connection { connected: bool },
    OpponentJoined,
    OpponentLeft,
    RemoteMove,
}

/// What to do when an acknowledgement arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Continuation {
    Created { generation: u64, color: Color, name: String },
    Joined { generation: u64, room_id: RoomId, name: String },
    Left { room_id: RoomId },
}

impl Continuation {
    /// Belongs to a session generation that has since been left.
    fn is_stale(&self, current: u64) -> bool {
        match self {
            Self::Created { generation, .. } | Self::Joined { generation, .. } => {
                *generation != current
            },
            Self::Left { .. } => false,
        }
    }
}

/// Effects of a session operation, turned into client actions by the caller.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SessionAction {
    Send(Frame),
    MoveApplied(Move),
    BoardReset,
    StatusChanged(SessionStatus),
    GameOver(GameResult),
    Notify { id: Option<&'static str>, kind: NoticeKind, message: String },
    ConnectionChanged { connected: bool },
}

/// Session state for one client.
#[derive(Debug, Clone)]
pub struct GameSession {
    channel: SyncChannel<Handler, Continuation>,
    status: SessionStatus,
    room_id: Option<RoomId>,
    local_color: Color,
    opponent: Option<PlayerInfo>,
    name: Option<String>,
    generation: u64,
    pending: Option<EventName>,
    subscriptions: Vec<SubscriptionId>,
}

impl GameSession {
    pub(crate) fn new() -> Self {
        let mut channel = SyncChannel::new();
        channel.subscribe(EventName::Connect, Handler::Connection { connected: true });
        channel.subscribe(EventName::Disconnect, Handler::Connection { connected: false });

        Self {
            channel,
            status: SessionStatus::Idle,
            room_id: None,
            local_color: Color::White,
            opponent: None,
            name: None,
            generation: 0,
            pending: None,
            subscriptions: Vec::new(),
        }
    }

    /// Lifecycle state.
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Room code, once the relay assigned or accepted one.
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Color this client plays.
    pub fn local_color(&self) -> Color {
        self.local_color
    }

    /// The other player, while present.
    pub fn opponent(&self) -> Option<&PlayerInfo> {
        self.opponent.as_ref()
    }

    /// Name given to create or join.
    pub fn player_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Session generation. Grows on every leave.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Create or join request awaiting its reply.
    pub fn pending_request(&self) -> Option<EventName> {
        self.pending
    }

    /// Final result, once the game ended.
    pub fn result(&self) -> Option<GameResult> {
        match self.status {
            SessionStatus::Ended(result) => Some(result),
            _ => None,
        }
    }

    /// Transport is up.
    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    /// Handlers currently registered for `name`.
    pub fn subscriber_count(&self, name: EventName) -> usize {
        self.channel.subscriber_count(name)
    }

    /// Who may pick up pieces right now.
    pub fn interaction_mode(&self) -> InteractionMode {
        match self.status {
            SessionStatus::Idle => InteractionMode::Free,
            SessionStatus::InProgress => InteractionMode::Restricted(self.local_color),
            SessionStatus::Hosting(_) | SessionStatus::Ended(_) => InteractionMode::Locked,
        }
    }

    /// Transport came up or went down.
    pub(crate) fn connection_changed(&mut self, connected: bool) -> Vec<SessionAction> {
        let handlers = if connected { self.channel.connect() } else { self.channel.disconnect() };

        let mut actions = Vec::new();
        for handler in handlers {
            if let Handler::Connection { connected } = handler {
                actions.extend(self.on_connection(connected));
            }
        }
        actions
    }

    fn on_connection(&self, connected: bool) -> Vec<SessionAction> {
        tracing::info!(connected, "connection changed");
        let mut actions = vec![SessionAction::ConnectionChanged { connected }];
        if !connected {
            actions.push(SessionAction::Notify {
                id: Some(CONNECTION_LOST_NOTICE),
                kind: NoticeKind::Error,
                message: "connection lost".to_string(),
            });
        }
        actions
    }

    /// Ask the relay for a new room.
    pub(crate) fn create(
        &mut self,
        color: Color,
        name: String,
    ) -> Result<Vec<SessionAction>, ClientError> {
        self.ensure_can_request()?;

        let payload = CreateGame { color, name: name.clone() };
        let continuation = Continuation::Created { generation: self.generation, color, name };
        let frame = self.channel.send_with_ack(EventName::CreateGame, &payload, continuation)?;

        self.pending = Some(EventName::CreateGame);
        tracing::info!(%color, "create-game sent");
        Ok(vec![SessionAction::Send(frame)])
    }

    /// Ask the relay to join `room_id`.
    pub(crate) fn join(
        &mut self,
        room_id: RoomId,
        name: String,
    ) -> Result<Vec<SessionAction>, ClientError> {
        self.ensure_can_request()?;

        let payload = JoinGame { room_id: room_id.clone(), name: name.clone() };
        let continuation =
            Continuation::Joined { generation: self.generation, room_id: room_id.clone(), name };
        let frame = self.channel.send_with_ack(EventName::JoinGame, &payload, continuation)?;

        self.pending = Some(EventName::JoinGame);
        tracing::info!(%room_id, "join-game sent");
        Ok(vec![SessionAction::Send(frame)])
    }

    fn ensure_can_request(&self) -> Result<(), ClientError> {
        if let Some(request) = self.pending {
            return Err(ClientError::RequestPending { request });
        }
        if self.room_id.is_some() {
            return Err(ClientError::invalid_state("already in a game, leave first"));
        }
        Ok(())
    }

    /// Leave the current session and return to the sandbox.
    ///
    /// Does nothing if no session was ever entered or requested.
    pub(crate) fn leave<O: Oracle>(&mut self, oracle: &mut O) -> Vec<SessionAction> {
        let active =
            self.room_id.is_some() || self.pending.is_some() || self.status != SessionStatus::Idle;
        if !active {
            tracing::debug!("leave ignored, no session");
            return Vec::new();
        }

        let mut actions = Vec::new();
        if let Some(room_id) = self.room_id.take() {
            let payload = LeaveGame { room_id: room_id.clone() };
            let continuation = Continuation::Left { room_id: room_id.clone() };
            match self.channel.send_with_ack(EventName::LeaveGame, &payload, continuation) {
                Ok(frame) => actions.push(SessionAction::Send(frame)),
                Err(e) => tracing::warn!(%room_id, error = %e, "leave-game not sent"),
            }
            tracing::info!(%room_id, "left game");
        }

        for id in self.subscriptions.drain(..) {
            self.channel.unsubscribe(id);
        }
        self.generation += 1;
        let generation = self.generation;
        let dropped = self.channel.discard_acks(|k| k.is_stale(generation));
        if dropped > 0 {
            tracing::debug!(dropped, "unanswered requests forgotten");
        }
        self.pending = None;
        self.opponent = None;
        self.name = None;
        self.local_color = Color::White;
        self.status = SessionStatus::Idle;
        oracle.reset();

        actions.push(SessionAction::BoardReset);
        actions.push(SessionAction::StatusChanged(SessionStatus::Idle));
        actions
    }

    /// Play a move made on this client.
    ///
    /// The oracle is updated before the relay; if relaying fails the move
    /// stays applied.
    pub(crate) fn apply_local_move<O: Oracle>(
        &mut self,
        mv: Move,
        oracle: &mut O,
    ) -> Result<Vec<SessionAction>, ClientError> {
        match self.status {
            SessionStatus::Ended(_) => return Err(ClientError::invalid_state("game is over")),
            SessionStatus::Hosting(_) => {
                return Err(ClientError::invalid_state("waiting for an opponent"));
            },
            SessionStatus::InProgress if oracle.side_to_move() != self.local_color => {
                return Err(ClientError::NotYourTurn);
            },
            SessionStatus::InProgress | SessionStatus::Idle => {},
        }

        oracle.apply(&mv).inspect_err(|e| tracing::warn!(%mv, error = %e, "local move rejected"))?;
        tracing::debug!(%mv, "local move applied");

        let mut actions = vec![SessionAction::MoveApplied(mv)];
        if let (SessionStatus::InProgress, Some(room_id)) = (&self.status, &self.room_id) {
            let payload = MakeMove { mv, room_id: room_id.clone() };
            match self.channel.send(EventName::MakeMove, &payload) {
                Ok(frame) => actions.push(SessionAction::Send(frame)),
                Err(e) => {
                    tracing::warn!(%mv, error = %e, "move applied locally but not relayed");
                    actions.push(SessionAction::Notify {
                        id: None,
                        kind: NoticeKind::Error,
                        message: format!("move {mv} was not delivered"),
                    });
                },
            }
        }
        actions.extend(self.check_terminal(oracle));
        Ok(actions)
    }

    /// Route an incoming frame to its subscribers or waiting continuation.
    pub(crate) fn handle_frame<O: Oracle>(
        &mut self,
        frame: &Frame,
        oracle: &mut O,
    ) -> Result<Vec<SessionAction>, ClientError> {
        match frame.kind {
            FrameKind::Event(name) if name.is_lifecycle() => {
                tracing::warn!(%name, "lifecycle event received as frame, ignored");
                Ok(Vec::new())
            },
            FrameKind::Event(name) => {
                let handlers = self.channel.dispatch(name);
                if handlers.is_empty() {
                    tracing::debug!(%name, "no subscriber for event");
                }
                let mut actions = Vec::new();
                for handler in handlers {
                    actions.extend(self.run_handler(handler, frame, oracle)?);
                }
                Ok(actions)
            },
            FrameKind::Reply { request_id } => match self.channel.resolve_ack(request_id) {
                Some(continuation) => self.run_continuation(continuation, frame, oracle),
                None => Ok(Vec::new()),
            },
            FrameKind::Request { name, request_id } => {
                tracing::warn!(%name, request_id, "unexpected request from relay");
                Ok(Vec::new())
            },
        }
    }

    fn run_handler<O: Oracle>(
        &mut self,
        handler: Handler,
        frame: &Frame,
        oracle: &mut O,
    ) -> Result<Vec<SessionAction>, ClientError> {
        match handler {
            Handler::Connection { .. } => Ok(Vec::new()),
            Handler::OpponentJoined => {
                let info: PlayerInfo = frame.decode_body()?;
                Ok(self.on_opponent_joined(info))
            },
            Handler::OpponentLeft => Ok(self.on_opponent_left()),
            Handler::RemoteMove => {
                let RemoteMove { mv } = frame.decode_body()?;
                Ok(self.on_remote_move(mv, oracle))
            },
        }
    }

    fn run_continuation<O: Oracle>(
        &mut self,
        continuation: Continuation,
        frame: &Frame,
        oracle: &mut O,
    ) -> Result<Vec<SessionAction>, ClientError> {
        match continuation {
            Continuation::Left { room_id } => {
                let ack: Ack<Empty> = frame.decode_body()?;
                if ack.success {
                    tracing::debug!(%room_id, "leave acknowledged");
                } else {
                    tracing::warn!(%room_id, reason = ?ack.reason, "leave refused");
                }
                Ok(Vec::new())
            },
            ref stale if stale.is_stale(self.generation) => {
                tracing::debug!(current = self.generation, "stale acknowledgement ignored");
                Ok(Vec::new())
            },
            // The continuation is gone once resolved, so the request is over
            // even when its reply turns out to be unreadable.
            Continuation::Created { color, name, .. } => {
                self.pending = None;
                let ack: Ack<RoomId> = frame.decode_body()?;
                Ok(self.on_created(ack, color, name, oracle))
            },
            Continuation::Joined { room_id, name, .. } => {
                self.pending = None;
                let ack: Ack<PlayerInfo> = frame.decode_body()?;
                Ok(self.on_joined(ack, room_id, name, oracle))
            },
        }
    }

    fn on_created<O: Oracle>(
        &mut self,
        ack: Ack<RoomId>,
        color: Color,
        name: String,
        oracle: &mut O,
    ) -> Vec<SessionAction> {
        let reason = ack.reason.clone();
        let Some(room_id) = ack.into_payload() else {
            tracing::warn!(?reason, "create-game refused");
            return vec![failure_notice("could not create game", reason)];
        };

        tracing::info!(%room_id, %color, "hosting game");
        self.room_id = Some(room_id.clone());
        self.local_color = color;
        self.name = Some(name);
        self.opponent = None;
        self.status = SessionStatus::Hosting(room_id.clone());
        self.subscribe_session();
        oracle.reset();

        vec![SessionAction::BoardReset, SessionAction::StatusChanged(SessionStatus::Hosting(room_id))]
    }

    fn on_joined<O: Oracle>(
        &mut self,
        ack: Ack<PlayerInfo>,
        room_id: RoomId,
        name: String,
        oracle: &mut O,
    ) -> Vec<SessionAction> {
        let reason = ack.reason.clone();
        let Some(host) = ack.into_payload() else {
            tracing::warn!(%room_id, ?reason, "join-game refused");
            return vec![failure_notice("could not join game", reason)];
        };

        // The host picked a color; the joiner gets the other one.
        self.local_color = host.color.opposite();
        tracing::info!(%room_id, host = %host.name, color = %self.local_color, "joined game");

        let message = format!("playing {} against {}", self.local_color, host.name);
        self.room_id = Some(room_id);
        self.name = Some(name);
        self.opponent = Some(host);
        self.status = SessionStatus::InProgress;
        self.subscribe_session();
        oracle.reset();

        vec![
            SessionAction::BoardReset,
            SessionAction::StatusChanged(SessionStatus::InProgress),
            SessionAction::Notify { id: None, kind: NoticeKind::Info, message },
        ]
    }

    fn subscribe_session(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.channel.unsubscribe(id);
        }
        self.subscriptions = vec![
            self.channel.subscribe(EventName::OpponentConnected, Handler::OpponentJoined),
            self.channel.subscribe(EventName::OpponentDisconnected, Handler::OpponentLeft),
            self.channel.subscribe(EventName::MakeMove, Handler::RemoteMove),
        ];
    }

    fn on_opponent_joined(&mut self, info: PlayerInfo) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        match self.status {
            SessionStatus::Hosting(_) => {
                self.status = SessionStatus::InProgress;
                actions.push(SessionAction::StatusChanged(SessionStatus::InProgress));
            },
            SessionStatus::InProgress | SessionStatus::Ended(_) => {},
            SessionStatus::Idle => {
                tracing::debug!(opponent = %info.name, "opponent joined outside a session");
                return actions;
            },
        }

        if info.color == self.local_color {
            tracing::warn!(opponent = %info.name, color = %info.color, "opponent reported our color");
        }
        tracing::info!(opponent = %info.name, "opponent joined");
        actions.push(SessionAction::Notify {
            id: Some(OPPONENT_JOINED_NOTICE),
            kind: NoticeKind::Info,
            message: format!("{} joined the game", info.name),
        });
        self.opponent = Some(info);
        actions
    }

    fn on_opponent_left(&mut self) -> Vec<SessionAction> {
        // Notification only: the session and the game stay as they are.
        let Some(opponent) = self.opponent.take() else {
            return Vec::new();
        };
        tracing::info!(opponent = %opponent.name, "opponent left");
        vec![SessionAction::Notify {
            id: None,
            kind: NoticeKind::Info,
            message: format!("{} left the game", opponent.name),
        }]
    }

    fn on_remote_move<O: Oracle>(&mut self, mv: Move, oracle: &mut O) -> Vec<SessionAction> {
        if self.status != SessionStatus::InProgress {
            tracing::warn!(%mv, status = ?self.status, "remote move outside a running game discarded");
            return Vec::new();
        }
        if oracle.side_to_move() == self.local_color {
            tracing::warn!(%mv, "remote move out of turn discarded");
            return Vec::new();
        }
        if let Err(e) = oracle.apply(&mv) {
            tracing::warn!(%mv, error = %e, "remote move discarded");
            return Vec::new();
        }
        tracing::debug!(%mv, "remote move applied");

        let mut actions = vec![SessionAction::MoveApplied(mv)];
        actions.extend(self.check_terminal(oracle));
        actions
    }

    fn check_terminal<O: Oracle>(&mut self, oracle: &O) -> Vec<SessionAction> {
        let Some(result) = terminal::evaluate(oracle, self.local_color) else {
            return Vec::new();
        };
        tracing::info!(kind = %result.kind, outcome = ?result.outcome, "game over");
        self.status = SessionStatus::Ended(result);
        vec![
            SessionAction::StatusChanged(SessionStatus::Ended(result)),
            SessionAction::GameOver(result),
        ]
    }
}

fn failure_notice(what: &str, reason: Option<String>) -> SessionAction {
    let message = match reason {
        Some(reason) => format!("{what}: {reason}"),
        None => what.to_string(),
    };
    SessionAction::Notify { id: None, kind: NoticeKind::Error, message }
}

#[cfg(test)]
mod tests {
    use kingside_core::{Outcome, Square, TerminalKind};
    use kingside_rules::ShakmatyOracle;

    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn mv(from: &str, to: &str) -> Move {
        Move::new(sq(from), sq(to))
    }

    fn connected() -> GameSession {
        let mut session = GameSession::new();
        session.connection_changed(true);
        session
    }

    fn sent(actions: &[SessionAction]) -> Vec<&Frame> {
        actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::Send(frame) => Some(frame),
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

    fn host(session: &mut GameSession, oracle: &mut ShakmatyOracle, color: Color) {
        let actions = session.create(color, "alice".to_string()).unwrap();
        let id = request_id(sent(&actions)[0]);
        let reply = Frame::reply(id, &Ack::ok("ROOM01".to_string())).unwrap();
        session.handle_frame(&reply, oracle).unwrap();
    }

    fn opponent_arrives(session: &mut GameSession, oracle: &mut ShakmatyOracle, color: Color) -> Vec<SessionAction> {
        let info = PlayerInfo { name: "bob".to_string(), color };
        let event = Frame::event(EventName::OpponentConnected, &info).unwrap();
        session.handle_frame(&event, oracle).unwrap()
    }

    fn remote(session: &mut GameSession, oracle: &mut ShakmatyOracle, m: Move) -> Vec<SessionAction> {
        let event = Frame::event(EventName::MakeMove, &RemoteMove { mv: m }).unwrap();
        session.handle_frame(&event, oracle).unwrap()
    }

    #[test]
    fn create_then_opponent_starts_game() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();

        host(&mut session, &mut oracle, Color::White);
        assert_eq!(session.status(), &SessionStatus::Hosting("ROOM01".to_string()));
        assert_eq!(session.room_id(), Some("ROOM01"));
        assert_eq!(session.pending_request(), None);
        assert_eq!(session.interaction_mode(), InteractionMode::Locked);

        let actions = opponent_arrives(&mut session, &mut oracle, Color::Black);
        assert!(actions.contains(&SessionAction::StatusChanged(SessionStatus::InProgress)));
        assert_eq!(session.opponent().unwrap().name, "bob");
        assert_eq!(session.interaction_mode(), InteractionMode::Restricted(Color::White));
    }

    #[test]
    fn create_failure_stays_idle_with_notice() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();

        let actions = session.create(Color::White, "alice".to_string()).unwrap();
        let reply = Frame::reply(request_id(sent(&actions)[0]), &Ack::<RoomId>::err("full")).unwrap();
        let actions = session.handle_frame(&reply, &mut oracle).unwrap();

        assert_eq!(session.status(), &SessionStatus::Idle);
        assert_eq!(session.pending_request(), None);
        assert!(matches!(
            &actions[..],
            [SessionAction::Notify { kind: NoticeKind::Error, message, .. }] if message.contains("full")
        ));
    }

    #[test]
    fn second_request_while_pending_is_rejected() {
        let mut session = connected();
        session.create(Color::White, "alice".to_string()).unwrap();

        let err = session.join("ROOM01".to_string(), "alice".to_string()).unwrap_err();
        assert_eq!(err, ClientError::RequestPending { request: EventName::CreateGame });
    }

    #[test]
    fn create_while_disconnected_fails() {
        let mut session = GameSession::new();
        let err = session.create(Color::White, "alice".to_string()).unwrap_err();
        assert!(matches!(err, ClientError::Channel(_)));
        assert_eq!(session.pending_request(), None);
    }

    #[test]
    fn joiner_takes_complement_of_host_color() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();

        let actions = session.join("ROOM01".to_string(), "bob".to_string()).unwrap();
        let host = PlayerInfo { name: "alice".to_string(), color: Color::White };
        let reply = Frame::reply(request_id(sent(&actions)[0]), &Ack::ok(host)).unwrap();
        session.handle_frame(&reply, &mut oracle).unwrap();

        assert_eq!(session.local_color(), Color::Black);
        assert_eq!(session.status(), &SessionStatus::InProgress);
        assert_eq!(session.opponent().unwrap().color, Color::White);
    }

    #[test]
    fn create_then_leave_returns_to_defaults() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();
        host(&mut session, &mut oracle, Color::Black);

        let actions = session.leave(&mut oracle);
        let frames = sent(&actions);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].name(), Some(EventName::LeaveGame));

        assert_eq!(session.status(), &SessionStatus::Idle);
        assert_eq!(session.room_id(), None);
        assert!(session.opponent().is_none());
        assert_eq!(session.local_color(), Color::White);
        assert_eq!(session.subscriber_count(EventName::MakeMove), 0);
        assert_eq!(session.subscriber_count(EventName::OpponentConnected), 0);
    }

    #[test]
    fn leave_without_session_is_noop() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();
        assert!(session.leave(&mut oracle).is_empty());
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn ack_after_leave_is_inert() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();

        let actions = session.create(Color::White, "alice".to_string()).unwrap();
        let id = request_id(sent(&actions)[0]);

        // Leaving before the reply sends nothing: no room was assigned yet.
        let left = session.leave(&mut oracle);
        assert!(sent(&left).is_empty());

        let reply = Frame::reply(id, &Ack::ok("ROOM01".to_string())).unwrap();
        assert!(session.handle_frame(&reply, &mut oracle).unwrap().is_empty());
        assert_eq!(session.status(), &SessionStatus::Idle);
        assert_eq!(session.room_id(), None);
    }

    #[test]
    fn unreadable_reply_still_ends_the_request() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();

        let actions = session.create(Color::White, "alice".to_string()).unwrap();
        let id = request_id(sent(&actions)[0]);
        let reply = Frame::reply(id, &"garbage").unwrap();

        let err = session.handle_frame(&reply, &mut oracle).unwrap_err();
        assert!(matches!(err, ClientError::Proto(_)));
        assert_eq!(session.pending_request(), None);
        assert_eq!(session.status(), &SessionStatus::Idle);

        // A new request goes through and its reply is honoured.
        let actions = session.create(Color::White, "alice".to_string()).unwrap();
        let reply = Frame::reply(request_id(sent(&actions)[0]), &Ack::ok("ROOM02".to_string())).unwrap();
        session.handle_frame(&reply, &mut oracle).unwrap();
        assert_eq!(session.room_id(), Some("ROOM02"));
    }

    #[test]
    fn leaving_forgets_unanswered_requests() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();

        session.join("ROOM01".to_string(), "bob".to_string()).unwrap();
        assert_eq!(session.channel.pending_acks(), 1);

        session.leave(&mut oracle);
        assert_eq!(session.channel.pending_acks(), 0);
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn leave_keeps_its_own_acknowledgement() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();
        host(&mut session, &mut oracle, Color::White);
        assert_eq!(session.player_name(), Some("alice"));

        let actions = session.leave(&mut oracle);
        assert_eq!(session.player_name(), None);
        assert_eq!(session.channel.pending_acks(), 1);

        let reply = Frame::reply(request_id(sent(&actions)[0]), &Ack::ok(Empty {})).unwrap();
        assert!(session.handle_frame(&reply, &mut oracle).unwrap().is_empty());
        assert_eq!(session.channel.pending_acks(), 0);
    }

    #[test]
    fn local_move_then_second_local_move_rejected() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();
        host(&mut session, &mut oracle, Color::White);
        opponent_arrives(&mut session, &mut oracle, Color::Black);

        let actions = session.apply_local_move(mv("e2", "e4"), &mut oracle).unwrap();
        assert_eq!(actions[0], SessionAction::MoveApplied(mv("e2", "e4")));
        let relay = sent(&actions);
        assert_eq!(relay.len(), 1);
        let body: MakeMove = relay[0].decode_body().unwrap();
        assert_eq!(body.room_id, "ROOM01");
        assert_eq!(oracle.side_to_move(), Color::Black);

        let err = session.apply_local_move(mv("d2", "d4"), &mut oracle).unwrap_err();
        assert_eq!(err, ClientError::NotYourTurn);

        remote(&mut session, &mut oracle, mv("e7", "e5"));
        assert_eq!(oracle.side_to_move(), Color::White);
        assert!(session.apply_local_move(mv("d2", "d4"), &mut oracle).is_ok());
    }

    #[test]
    fn moves_rejected_while_hosting() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();
        host(&mut session, &mut oracle, Color::White);

        assert!(matches!(
            session.apply_local_move(mv("e2", "e4"), &mut oracle),
            Err(ClientError::InvalidState { .. })
        ));
        assert_eq!(oracle.side_to_move(), Color::White);
    }

    #[test]
    fn relay_failure_keeps_local_move() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();
        host(&mut session, &mut oracle, Color::White);
        opponent_arrives(&mut session, &mut oracle, Color::Black);
        session.connection_changed(false);

        let actions = session.apply_local_move(mv("e2", "e4"), &mut oracle).unwrap();
        assert!(sent(&actions).is_empty());
        assert!(actions.iter().any(|a| matches!(a, SessionAction::Notify { kind: NoticeKind::Error, .. })));
        assert_eq!(oracle.side_to_move(), Color::Black);
    }

    #[test]
    fn remote_move_out_of_turn_or_illegal_is_discarded() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();
        host(&mut session, &mut oracle, Color::White);
        opponent_arrives(&mut session, &mut oracle, Color::Black);

        // White to move, and white is us.
        assert!(remote(&mut session, &mut oracle, mv("e7", "e5")).is_empty());

        session.apply_local_move(mv("e2", "e4"), &mut oracle).unwrap();
        assert!(remote(&mut session, &mut oracle, mv("e7", "e4")).is_empty());
        assert_eq!(oracle.side_to_move(), Color::Black);
    }

    #[test]
    fn opponent_leaving_keeps_the_game() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();
        host(&mut session, &mut oracle, Color::White);
        opponent_arrives(&mut session, &mut oracle, Color::Black);

        let event = Frame::event(EventName::OpponentDisconnected, &Empty {}).unwrap();
        let actions = session.handle_frame(&event, &mut oracle).unwrap();

        assert_eq!(actions.len(), 1);
        assert!(session.opponent().is_none());
        assert_eq!(session.status(), &SessionStatus::InProgress);
        assert_eq!(session.room_id(), Some("ROOM01"));
    }

    #[test]
    fn mate_ends_the_game() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();
        host(&mut session, &mut oracle, Color::Black);
        opponent_arrives(&mut session, &mut oracle, Color::White);

        remote(&mut session, &mut oracle, mv("f2", "f3"));
        session.apply_local_move(mv("e7", "e5"), &mut oracle).unwrap();
        remote(&mut session, &mut oracle, mv("g2", "g4"));
        let actions = session.apply_local_move(mv("d8", "h4"), &mut oracle).unwrap();

        let result = session.result().unwrap();
        assert_eq!(result.kind, TerminalKind::Checkmate);
        assert_eq!(result.outcome, Outcome::Win);
        assert!(actions.contains(&SessionAction::GameOver(result)));
        assert_eq!(session.interaction_mode(), InteractionMode::Locked);

        assert!(session.apply_local_move(mv("a7", "a6"), &mut oracle).is_err());
    }

    #[test]
    fn sandbox_moves_are_not_relayed() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();

        let actions = session.apply_local_move(mv("e2", "e4"), &mut oracle).unwrap();
        assert_eq!(actions, vec![SessionAction::MoveApplied(mv("e2", "e4"))]);
        let actions = session.apply_local_move(mv("e7", "e5"), &mut oracle).unwrap();
        assert!(sent(&actions).is_empty());
    }

    #[test]
    fn remote_move_before_any_session_has_no_subscriber() {
        let mut oracle = ShakmatyOracle::new();
        let mut session = connected();
        assert!(remote(&mut session, &mut oracle, mv("e2", "e4")).is_empty());
        assert_eq!(oracle.side_to_move(), Color::White);
    }
}
