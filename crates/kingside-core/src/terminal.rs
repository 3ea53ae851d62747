//! Terminal-state detection.

use std::fmt;

use kingside_proto::Color;

use crate::Oracle;

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    /// Side to move is mated.
    Checkmate,
    /// Side to move cannot move and is not in check.
    Stalemate,
    /// Neither side can mate.
    InsufficientMaterial,
    /// Same position three times.
    ThreefoldRepetition,
}

impl fmt::Display for TerminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
            Self::InsufficientMaterial => "insufficient material",
            Self::ThreefoldRepetition => "threefold repetition",
        })
    }
}

/// Result from the local player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Local player won.
    Win,
    /// Local player lost.
    Lose,
    /// Nobody won.
    Draw,
}

/// Final result of a game. Never changes once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameResult {
    /// Terminal classification.
    pub kind: TerminalKind,
    /// Local outcome.
    pub outcome: Outcome,
}

/// Check the oracle's terminal predicates in priority order.
///
/// Checkmate, stalemate, insufficient material, threefold repetition. The
/// first true predicate wins and the rest are not evaluated. On checkmate the
/// side to move (the one without a reply) loses.
pub fn evaluate<O: Oracle + ?Sized>(oracle: &O, local: Color) -> Option<GameResult> {
    let kind = if oracle.is_checkmate() {
        TerminalKind::Checkmate
    } else if oracle.is_stalemate() {
        TerminalKind::Stalemate
    } else if oracle.is_insufficient_material() {
        TerminalKind::InsufficientMaterial
    } else if oracle.is_threefold_repetition() {
        TerminalKind::ThreefoldRepetition
    } else {
        return None;
    };

    let outcome = match kind {
        TerminalKind::Checkmate if oracle.side_to_move() == local => Outcome::Lose,
        TerminalKind::Checkmate => Outcome::Win,
        _ => Outcome::Draw,
    };

    Some(GameResult { kind, outcome })
}
