//! Move-legality oracle contract.
//!
//! The oracle owns the position. The client asks it which moves are legal,
//! hands it moves to play, and polls its terminal predicates. Exactly one
//! component mutates it at a time: callers lend `&mut` only to the session
//! applying a move.

use kingside_proto::{Color, Move, Square};

use crate::{BoardSnapshot, OracleError, Piece};

/// One legal-move entry.
///
/// Promotion alternatives to the same destination are reported as a single
/// entry with `promotion_required` set; the piece is chosen later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegalMove {
    /// Origin square.
    pub from: Square,
    /// Destination square (king destination for castling).
    pub to: Square,
    /// The move is only complete with a promotion piece.
    pub promotion_required: bool,
}

impl LegalMove {
    /// The move without promotion data.
    pub fn to_move(self) -> Move {
        Move::new(self.from, self.to)
    }
}

/// External chess rule engine.
pub trait Oracle {
    /// Legal moves for the piece on `from`, in the oracle's order.
    ///
    /// Empty when the square is empty or its piece cannot move.
    fn legal_moves(&self, from: Square) -> Vec<LegalMove>;

    /// Play `mv`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::IllegalMove`] and leaves the position unchanged
    /// if the move is not legal.
    fn apply(&mut self, mv: &Move) -> Result<(), OracleError>;

    /// Color to move.
    fn side_to_move(&self) -> Color;

    /// Side to move is checkmated.
    fn is_checkmate(&self) -> bool;

    /// Side to move has no legal move and is not in check.
    fn is_stalemate(&self) -> bool;

    /// Neither side can mate.
    fn is_insufficient_material(&self) -> bool;

    /// The current position occurred at least three times.
    fn is_threefold_repetition(&self) -> bool;

    /// Board in 0x88 layout.
    fn snapshot(&self) -> BoardSnapshot;

    /// Back to the initial position, forgetting history.
    fn reset(&mut self);

    /// Piece on `square`.
    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.snapshot().get(square)
    }
}
