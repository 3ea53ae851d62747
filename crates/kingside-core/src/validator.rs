//! Move validation at the drag boundary.
//!
//! Two questions are asked of the oracle during a drag: which squares may the
//! picked-up piece go to, and, once it is dropped, is the drop a move, a
//! promotion that still needs a piece, or nothing at all.

use kingside_proto::{Color, Move, Promotion, PromotionPiece, Square};

use crate::{LegalMove, Oracle};

/// Outcome of dropping a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Dropped back on the origin square.
    Cancel,
    /// Destination is not among the legal targets.
    Illegal,
    /// Legal destination, but the player must pick a piece first.
    NeedsPromotion(PendingPromotion),
    /// Complete legal move.
    Ready(Move),
}

/// A promotion waiting for the piece choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPromotion {
    /// Pawn origin.
    pub from: Square,
    /// Promotion square.
    pub to: Square,
    /// Color of the promoting pawn.
    pub color: Color,
}

impl PendingPromotion {
    /// Complete the move with `piece`.
    pub fn finalize(self, piece: PromotionPiece) -> Move {
        Move::with_promotion(self.from, self.to, Promotion { piece, color: self.color })
    }
}

/// Legal targets for a drag starting on `from`.
///
/// Empty unless `from` holds a piece of the side to move. Entries are
/// deduplicated by destination in oracle order; a destination requires a
/// promotion if any entry for it does.
pub fn legal_targets<O: Oracle + ?Sized>(oracle: &O, from: Square) -> Vec<LegalMove> {
    let Some(piece) = oracle.piece_at(from) else {
        return Vec::new();
    };
    if piece.color != oracle.side_to_move() {
        return Vec::new();
    }

    let mut targets: Vec<LegalMove> = Vec::new();
    for entry in oracle.legal_moves(from) {
        if entry.from != from {
            tracing::warn!(%from, reported = %entry.from, "oracle returned move from another square");
            continue;
        }
        match targets.iter_mut().find(|t| t.to == entry.to) {
            Some(existing) => existing.promotion_required |= entry.promotion_required,
            None => targets.push(entry),
        }
    }
    targets
}

/// Classify a drop of the piece from `from` onto `to`.
pub fn resolve(targets: &[LegalMove], from: Square, to: Square, mover: Color) -> Resolution {
    if from == to {
        return Resolution::Cancel;
    }
    match targets.iter().find(|t| t.from == from && t.to == to) {
        None => Resolution::Illegal,
        Some(target) if target.promotion_required => {
            Resolution::NeedsPromotion(PendingPromotion { from, to, color: mover })
        },
        Some(target) => Resolution::Ready(target.to_move()),
    }
}
