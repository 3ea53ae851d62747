//! Client events and actions.
//!
//! Events flow into the client from the caller (pointer input, user intents,
//! frames, ticks). Actions flow out for the caller to execute (send frames,
//! redraw, show notices).

use std::time::Instant;

use kingside_core::{BoardView, Color, GameResult, Move, PromotionPiece, Square};
use kingside_proto::{Frame, RoomId};

use crate::{config::BoardGeometry, notice::Notice, session::SessionStatus};

/// Events the caller feeds into the client.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Pointer pressed at board pixel `(x, y)`.
    PointerDown {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },

    /// Pointer moved.
    PointerMove {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },

    /// Pointer released.
    PointerUp {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },

    /// The promotion selector picked a piece.
    ChoosePromotion(PromotionPiece),

    /// Play a move without going through pointer input.
    PlayMove(Move),

    /// Host a new game.
    CreateGame {
        /// Color to play.
        color: Color,
        /// Display name.
        name: String,
    },

    /// Join a game by room code.
    JoinGame {
        /// Room code.
        room_id: RoomId,
        /// Display name.
        name: String,
    },

    /// Leave the current game.
    LeaveGame,

    /// A frame arrived from the relay.
    FrameReceived(Frame),

    /// Transport connected.
    Connected,

    /// Transport disconnected.
    Disconnected,

    /// Time passed. Expires notices.
    Tick {
        /// Current time.
        now: Instant,
    },

    /// The board was resized or flipped.
    ///
    /// During a session the orientation stays with the local color; the
    /// requested `flipped` takes effect once back in the sandbox.
    SetGeometry(BoardGeometry),
}

/// Actions the client asks the caller to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Send a frame to the relay.
    Send(Frame),

    /// Redraw the board from this projection.
    Render(BoardView),

    /// Highlight these squares; empty clears highlights.
    Highlight(Vec<Square>),

    /// Draw the dragged piece.
    DragPiece {
        /// Square it was picked up from.
        origin: Square,
        /// Top-left pixel of the piece.
        piece_at: (f32, f32),
        /// Square under the pointer.
        hovered: Option<Square>,
    },

    /// Snap the dragged piece back.
    ReturnPiece {
        /// Square it returns to.
        origin: Square,
    },

    /// Show the promotion selector.
    PromptPromotion {
        /// Promotion square.
        square: Square,
        /// Color of the promoting pawn.
        color: Color,
    },

    /// Show a notice.
    Notice(Notice),

    /// Hide a notice.
    NoticeExpired(Notice),

    /// Session status changed.
    SessionChanged(SessionStatus),

    /// The game ended.
    GameOver(GameResult),

    /// Transport came up or went down.
    ConnectionChanged {
        /// New state.
        connected: bool,
    },
}
