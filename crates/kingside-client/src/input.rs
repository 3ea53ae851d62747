//! Pointer-driven drag state machine.
//!
//! ```text
//!   Idle ──down on movable piece──▶ Dragging ──up on promotion square──▶ AwaitingPromotion
//!    ▲                                 │                                     │
//!    └──────── up (move / cancel) ─────┘◀──── piece chosen / dismissed ──────┘
//! ```
//!
//! The controller never touches the oracle mutably. It reads legal targets on
//! pointer-down and hands a finished [`Move`] back to the caller, which decides
//! whether to play it.

use kingside_core::{
    Color, LegalMove, Move, Oracle, PendingPromotion, PromotionPiece, Resolution, Square,
    validator,
};

use crate::config::BoardGeometry;

/// Who may pick up pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Whichever side is to move (sandbox board).
    Free,
    /// Only this color, and only on its turn.
    Restricted(Color),
    /// Nobody, e.g. after the game ended.
    Locked,
}

impl InteractionMode {
    fn allows(self, piece: Color, side_to_move: Color) -> bool {
        match self {
            Self::Free => piece == side_to_move,
            Self::Restricted(local) => piece == side_to_move && piece == local,
            Self::Locked => false,
        }
    }
}

/// An active drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    /// Square the piece was picked up from.
    pub origin: Square,
    /// Clamped pointer position in pixels.
    pub pointer: (f32, f32),
    /// Square under the pointer.
    pub hovered: Option<Square>,
    /// Legal destinations from `origin`.
    pub targets: Vec<LegalMove>,
    mover: Color,
}

/// Controller state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No interaction in progress.
    #[default]
    Idle,
    /// A piece is being dragged.
    Dragging(DragState),
    /// A pawn was dropped on its promotion square; waiting for the piece.
    AwaitingPromotion(PendingPromotion),
}

/// What a pointer event led to.
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    /// Nothing to show.
    Ignored,
    /// A drag began; highlight these squares.
    DragStarted {
        /// Picked-up square.
        origin: Square,
        /// Legal destinations.
        targets: Vec<Square>,
    },
    /// The dragged piece moved.
    DragMoved {
        /// Picked-up square.
        origin: Square,
        /// Top-left pixel of the piece, centred on the pointer.
        piece_at: (f32, f32),
        /// Square under the pointer.
        hovered: Option<Square>,
    },
    /// The piece goes back to where it came from.
    Returned {
        /// Square it returns to.
        origin: Square,
    },
    /// Ask for a promotion piece.
    PromotionPrompt {
        /// Promotion square.
        square: Square,
        /// Color of the promoting pawn.
        color: Color,
    },
    /// A complete legal move to play.
    Move(Move),
}

/// Drag state machine for one board.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    geometry: BoardGeometry,
    state: InputState,
}

impl InputController {
    /// Idle controller for a board drawn with `geometry`.
    pub fn new(geometry: BoardGeometry) -> Self {
        Self { geometry, state: InputState::Idle }
    }

    /// Current state.
    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// Board geometry.
    pub fn geometry(&self) -> BoardGeometry {
        self.geometry
    }

    /// Change size or orientation. Any interaction in progress is dropped.
    pub fn set_geometry(&mut self, geometry: BoardGeometry) -> Option<Square> {
        self.geometry = geometry;
        self.reset()
    }

    /// Pointer pressed at `(x, y)`.
    pub fn pointer_down<O: Oracle + ?Sized>(
        &mut self,
        x: f32,
        y: f32,
        oracle: &O,
        mode: InteractionMode,
    ) -> InputOutcome {
        match &self.state {
            InputState::Dragging(_) => return InputOutcome::Ignored,
            InputState::AwaitingPromotion(pending) => {
                // Anything outside the selector dismisses it.
                let origin = pending.from;
                self.state = InputState::Idle;
                tracing::debug!(%origin, "promotion dismissed");
                return InputOutcome::Returned { origin };
            },
            InputState::Idle => {},
        }

        let Some(origin) = self.geometry.square_at(x, y) else {
            return InputOutcome::Ignored;
        };
        let Some(piece) = oracle.piece_at(origin) else {
            return InputOutcome::Ignored;
        };
        let side_to_move = oracle.side_to_move();
        if !mode.allows(piece.color, side_to_move) {
            return InputOutcome::Ignored;
        }

        let targets = validator::legal_targets(oracle, origin);
        let highlights = targets.iter().map(|t| t.to).collect();
        let pointer = self.geometry.clamp(x, y);

        tracing::debug!(%origin, targets = targets.len(), "drag started");
        self.state = InputState::Dragging(DragState {
            origin,
            pointer,
            hovered: Some(origin),
            targets,
            mover: piece.color,
        });
        InputOutcome::DragStarted { origin, targets: highlights }
    }

    /// Pointer moved to `(x, y)`.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> InputOutcome {
        let geometry = self.geometry;
        let InputState::Dragging(drag) = &mut self.state else {
            return InputOutcome::Ignored;
        };

        let (px, py) = geometry.clamp(x, y);
        drag.pointer = (px, py);
        drag.hovered = geometry.square_at(px, py);

        let half = geometry.square_size / 2.0;
        InputOutcome::DragMoved {
            origin: drag.origin,
            piece_at: (px - half, py - half),
            hovered: drag.hovered,
        }
    }

    /// Pointer released at `(x, y)`.
    pub fn pointer_up(&mut self, x: f32, y: f32) -> InputOutcome {
        if !matches!(self.state, InputState::Dragging(_)) {
            return InputOutcome::Ignored;
        }
        let InputState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return InputOutcome::Ignored;
        };

        let (px, py) = self.geometry.clamp(x, y);
        let Some(to) = self.geometry.square_at(px, py) else {
            return InputOutcome::Returned { origin: drag.origin };
        };

        match validator::resolve(&drag.targets, drag.origin, to, drag.mover) {
            Resolution::Cancel | Resolution::Illegal => {
                tracing::debug!(from = %drag.origin, %to, "drop rejected");
                InputOutcome::Returned { origin: drag.origin }
            },
            Resolution::NeedsPromotion(pending) => {
                self.state = InputState::AwaitingPromotion(pending);
                InputOutcome::PromotionPrompt { square: pending.to, color: pending.color }
            },
            Resolution::Ready(mv) => InputOutcome::Move(mv),
        }
    }

    /// The promotion selector picked `piece`.
    pub fn choose_promotion(&mut self, piece: PromotionPiece) -> InputOutcome {
        match self.state {
            InputState::AwaitingPromotion(pending) => {
                self.state = InputState::Idle;
                InputOutcome::Move(pending.finalize(piece))
            },
            _ => InputOutcome::Ignored,
        }
    }

    /// Drop whatever is in progress. Returns the square the piece goes back
    /// to, if any.
    pub fn reset(&mut self) -> Option<Square> {
        match std::mem::take(&mut self.state) {
            InputState::Idle => None,
            InputState::Dragging(drag) => Some(drag.origin),
            InputState::AwaitingPromotion(pending) => Some(pending.from),
        }
    }
}
