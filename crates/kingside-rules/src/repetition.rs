//! Position counting for threefold repetition.
//!
//! Two positions are the same when the same pieces stand on the same squares,
//! the same side is to move and the same moves are available. Comparing the
//! available moves covers castling rights and en passant without reading
//! them separately.

use std::collections::HashMap;

use kingside_core::Square;
use shakmaty::{Chess, Position, Role};

use crate::convert::{endpoints, from_shakmaty, to_shakmaty};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PositionKey {
    placement: [u8; 64],
    white_to_move: bool,
    moves: Vec<(u8, u8, u8)>,
}

impl PositionKey {
    fn of(position: &Chess) -> Self {
        let board = position.board();
        let mut placement = [0u8; 64];
        let squares = (0..64).filter_map(Square::from_index).map(to_shakmaty);
        for (cell, square) in placement.iter_mut().zip(squares) {
            *cell = board.piece_at(square).map_or(0, |p| {
                let side = if p.color == shakmaty::Color::White { 0 } else { 6 };
                1 + role_code(p.role) + side
            });
        }

        let mut moves: Vec<_> = position
            .legal_moves()
            .iter()
            .filter_map(endpoints)
            .map(|(from, to, promotion)| {
                (square_code(from), square_code(to), promotion.map_or(0, |r| 1 + role_code(r)))
            })
            .collect();
        moves.sort_unstable();

        Self { placement, white_to_move: position.turn() == shakmaty::Color::White, moves }
    }
}

fn role_code(role: Role) -> u8 {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

fn square_code(square: shakmaty::Square) -> u8 {
    from_shakmaty(square).and_then(|s| u8::try_from(s.index()).ok()).unwrap_or_default()
}

/// Occurrence count per position since the last clear.
#[derive(Debug, Clone, Default)]
pub(crate) struct RepetitionTable {
    seen: HashMap<PositionKey, u8>,
}

impl RepetitionTable {
    /// Count one more occurrence of `position`.
    pub(crate) fn record(&mut self, position: &Chess) {
        let count = self.seen.entry(PositionKey::of(position)).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// How often `position` has occurred.
    pub(crate) fn occurrences(&self, position: &Chess) -> u8 {
        self.seen.get(&PositionKey::of(position)).copied().unwrap_or(0)
    }

    pub(crate) fn clear(&mut self) {
        self.seen.clear();
    }
}
