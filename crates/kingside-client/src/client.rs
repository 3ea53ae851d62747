//! Client state machine.
//!
//! The `Client` owns the oracle and lends it out per call: `&O` to the input
//! controller, `&mut O` to the session. One event is handled at a time, so the
//! oracle never has two writers.
//!
//! While a session is open the board is drawn from the local player's side.
//! Back in the sandbox it returns to the orientation the caller last asked
//! for.

use kingside_core::{BoardView, Color, Environment, Move, Oracle};

use crate::{
    config::{BoardGeometry, ClientConfig},
    error::ClientError,
    event::{ClientAction, ClientEvent},
    input::{InputController, InputOutcome},
    notice::{Notice, NoticeBoard},
    session::{GameSession, SessionAction, SessionStatus},
};

/// Client state machine.
///
/// Pure state machine - returns actions, caller handles I/O.
///
/// # Type Parameters
///
/// - `O`: move-legality oracle
/// - `E`: Environment implementation for time/randomness
pub struct Client<O: Oracle, E: Environment> {
    oracle: O,
    env: E,
    input: InputController,
    session: GameSession,
    notices: NoticeBoard,
    sandbox_flipped: bool,
}

impl<O: Oracle, E: Environment> Client<O, E> {
    /// Create a client around `oracle`.
    pub fn new(env: E, oracle: O, config: &ClientConfig) -> Self {
        Self {
            oracle,
            env,
            input: InputController::new(config.geometry),
            session: GameSession::new(),
            notices: NoticeBoard::new(config.notice_ttl),
            sandbox_flipped: config.geometry.flipped,
        }
    }

    /// The oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Session state.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Input state.
    pub fn input(&self) -> &InputController {
        &self.input
    }

    /// Notices currently shown.
    pub fn notices(&self) -> &[Notice] {
        self.notices.live()
    }

    /// Current board projection.
    pub fn board(&self) -> BoardView {
        self.oracle.snapshot().project()
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the event cannot be processed. Pointer input
    /// never fails; an illegal drop is a silent no-op.
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::PointerDown { x, y } => {
                let mode = self.session.interaction_mode();
                let outcome = self.input.pointer_down(x, y, &self.oracle, mode);
                Ok(self.handle_input(outcome))
            },
            ClientEvent::PointerMove { x, y } => {
                let outcome = self.input.pointer_move(x, y);
                Ok(self.handle_input(outcome))
            },
            ClientEvent::PointerUp { x, y } => {
                let outcome = self.input.pointer_up(x, y);
                Ok(self.handle_input(outcome))
            },
            ClientEvent::ChoosePromotion(piece) => {
                let outcome = self.input.choose_promotion(piece);
                Ok(self.handle_input(outcome))
            },
            ClientEvent::PlayMove(mv) => self.handle_play(mv),
            ClientEvent::CreateGame { color, name } => {
                let actions = self.session.create(color, name)?;
                Ok(self.convert_session_actions(actions))
            },
            ClientEvent::JoinGame { room_id, name } => {
                let actions = self.session.join(room_id, name)?;
                Ok(self.convert_session_actions(actions))
            },
            ClientEvent::LeaveGame => {
                let actions = self.session.leave(&mut self.oracle);
                Ok(self.convert_session_actions(actions))
            },
            ClientEvent::FrameReceived(frame) => {
                let actions = self.session.handle_frame(&frame, &mut self.oracle)?;
                Ok(self.convert_session_actions(actions))
            },
            ClientEvent::Connected => {
                let actions = self.session.connection_changed(true);
                Ok(self.convert_session_actions(actions))
            },
            ClientEvent::Disconnected => {
                let actions = self.session.connection_changed(false);
                Ok(self.convert_session_actions(actions))
            },
            ClientEvent::Tick { now } => {
                Ok(self.notices.expire(now).into_iter().map(ClientAction::NoticeExpired).collect())
            },
            ClientEvent::SetGeometry(geometry) => {
                self.sandbox_flipped = geometry.flipped;
                let geometry = BoardGeometry { flipped: self.orientation(), ..geometry };
                Ok(self.apply_geometry(geometry))
            },
        }
    }

    /// Whether the board should be drawn from black's side right now.
    fn orientation(&self) -> bool {
        match self.session.status() {
            SessionStatus::Idle => self.sandbox_flipped,
            _ => self.session.local_color() == Color::Black,
        }
    }

    fn apply_geometry(&mut self, geometry: BoardGeometry) -> Vec<ClientAction> {
        let mut actions = Vec::new();
        if let Some(origin) = self.input.set_geometry(geometry) {
            actions.push(ClientAction::Highlight(Vec::new()));
            actions.push(ClientAction::ReturnPiece { origin });
        }
        actions.push(ClientAction::Render(self.board()));
        actions
    }

    /// Turn the board if the session moved to the other side of it.
    fn follow_orientation(&mut self) -> Vec<ClientAction> {
        let current = self.input.geometry();
        let flipped = self.orientation();
        if current.flipped == flipped {
            return Vec::new();
        }
        tracing::debug!(flipped, "board orientation follows session");
        self.apply_geometry(BoardGeometry { flipped, ..current })
    }

    /// Handle a programmatic move.
    fn handle_play(&mut self, mv: Move) -> Result<Vec<ClientAction>, ClientError> {
        let mut actions = Vec::new();
        if let Some(origin) = self.input.reset() {
            actions.push(ClientAction::Highlight(Vec::new()));
            actions.push(ClientAction::ReturnPiece { origin });
        }
        let session_actions = self.session.apply_local_move(mv, &mut self.oracle)?;
        actions.extend(self.convert_session_actions(session_actions));
        Ok(actions)
    }

    /// Turn an input outcome into actions, playing the move if one was made.
    fn handle_input(&mut self, outcome: InputOutcome) -> Vec<ClientAction> {
        match outcome {
            InputOutcome::Ignored => Vec::new(),
            InputOutcome::DragStarted { targets, .. } => vec![ClientAction::Highlight(targets)],
            InputOutcome::DragMoved { origin, piece_at, hovered } => {
                vec![ClientAction::DragPiece { origin, piece_at, hovered }]
            },
            InputOutcome::Returned { origin } => {
                vec![ClientAction::Highlight(Vec::new()), ClientAction::ReturnPiece { origin }]
            },
            InputOutcome::PromotionPrompt { square, color } => {
                vec![ClientAction::Highlight(Vec::new()), ClientAction::PromptPromotion { square, color }]
            },
            InputOutcome::Move(mv) => {
                let mut actions = vec![ClientAction::Highlight(Vec::new())];
                match self.session.apply_local_move(mv, &mut self.oracle) {
                    Ok(session_actions) => actions.extend(self.convert_session_actions(session_actions)),
                    Err(e) => {
                        tracing::debug!(%mv, error = %e, "dropped move not played");
                        actions.push(ClientAction::ReturnPiece { origin: mv.from });
                    },
                }
                actions
            },
        }
    }

    /// Convert session actions to client actions.
    fn convert_session_actions(&mut self, actions: Vec<SessionAction>) -> Vec<ClientAction> {
        let mut out = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                SessionAction::Send(frame) => out.push(ClientAction::Send(frame)),
                SessionAction::MoveApplied(_) | SessionAction::BoardReset => {
                    // Targets computed before this change are stale.
                    if let Some(origin) = self.input.reset() {
                        out.push(ClientAction::Highlight(Vec::new()));
                        out.push(ClientAction::ReturnPiece { origin });
                    }
                    out.push(ClientAction::Render(self.board()));
                },
                SessionAction::StatusChanged(status) => {
                    out.push(ClientAction::SessionChanged(status));
                    out.extend(self.follow_orientation());
                },
                SessionAction::GameOver(result) => out.push(ClientAction::GameOver(result)),
                SessionAction::Notify { id, kind, message } => {
                    if let Some(notice) = self.notices.post(id, kind, message, self.env.now()) {
                        out.push(ClientAction::Notice(notice));
                    }
                },
                SessionAction::ConnectionChanged { connected } => {
                    out.push(ClientAction::ConnectionChanged { connected });
                },
            }
        }
        out
    }
}
