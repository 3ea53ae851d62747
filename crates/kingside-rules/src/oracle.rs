//! [`Oracle`] implementation over `shakmaty::Chess`.

use kingside_core::{
    BoardSnapshot, Color, LegalMove, Move, Oracle, OracleError, Square, board::PADDED_CELLS,
};
use shakmaty::{CastlingMode, Chess, Position, fen::Fen};

use crate::{
    convert::{self, endpoints, from_shakmaty, to_shakmaty},
    repetition::RepetitionTable,
};

/// Occurrences of one position that make a threefold repetition.
const REPETITION_LIMIT: u8 = 3;

/// Standard chess through `shakmaty`.
///
/// Remembers the position it was created with; [`Oracle::reset`] returns
/// there and forgets the move history.
#[derive(Debug, Clone)]
pub struct ShakmatyOracle {
    initial: Chess,
    position: Chess,
    repetitions: RepetitionTable,
}

impl ShakmatyOracle {
    /// Oracle at the standard initial position.
    pub fn new() -> Self {
        Self::starting_at(Chess::default())
    }

    /// Oracle at the position described by `fen`.
    ///
    /// # Errors
    ///
    /// [`OracleError::InvalidPosition`] if `fen` does not parse or describes
    /// an illegal setup.
    pub fn from_fen(fen: &str) -> Result<Self, OracleError> {
        let parsed: Fen =
            fen.parse().map_err(|e| OracleError::InvalidPosition { reason: format!("{e}") })?;
        let position = parsed
            .into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| OracleError::InvalidPosition { reason: e.to_string() })?;
        Ok(Self::starting_at(position))
    }

    fn starting_at(position: Chess) -> Self {
        let mut repetitions = RepetitionTable::default();
        repetitions.record(&position);
        Self { initial: position.clone(), position, repetitions }
    }
}

impl Default for ShakmatyOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl Oracle for ShakmatyOracle {
    fn legal_moves(&self, from: Square) -> Vec<LegalMove> {
        let origin = to_shakmaty(from);
        let mut moves: Vec<LegalMove> = Vec::new();

        for (_, to, promotion) in
            self.position.legal_moves().iter().filter_map(endpoints).filter(|(f, ..)| *f == origin)
        {
            let Some(to) = from_shakmaty(to) else { continue };
            // One entry per destination; the piece is picked afterwards.
            if moves.iter().any(|m| m.to == to) {
                continue;
            }
            moves.push(LegalMove { from, to, promotion_required: promotion.is_some() });
        }
        moves
    }

    fn apply(&mut self, mv: &Move) -> Result<(), OracleError> {
        let mover = self.side_to_move();
        if mv.promotion.is_some_and(|p| p.color != mover) {
            tracing::warn!(%mv, %mover, "promotion encoded for the wrong color");
            return Err(OracleError::IllegalMove { mv: *mv });
        }

        let wanted =
            (to_shakmaty(mv.from), to_shakmaty(mv.to), mv.promotion.map(|p| convert::role(p.piece)));
        let legal = self.position.legal_moves().iter().find(|m| endpoints(m) == Some(wanted)).cloned();
        let Some(legal) = legal else {
            tracing::debug!(%mv, "move not in legal set");
            return Err(OracleError::IllegalMove { mv: *mv });
        };

        self.position.play_unchecked(legal);
        self.repetitions.record(&self.position);
        Ok(())
    }

    fn side_to_move(&self) -> Color {
        convert::color(self.position.turn())
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    fn is_threefold_repetition(&self) -> bool {
        self.repetitions.occurrences(&self.position) >= REPETITION_LIMIT
    }

    fn snapshot(&self) -> BoardSnapshot {
        let board = self.position.board();
        let mut cells = [None; PADDED_CELLS];
        for square in (0..64).filter_map(Square::from_index) {
            cells[square.to_0x88()] = board.piece_at(to_shakmaty(square)).map(convert::piece);
        }
        BoardSnapshot::from_cells(cells, self.side_to_move())
    }

    fn reset(&mut self) {
        self.position = self.initial.clone();
        self.repetitions.clear();
        self.repetitions.record(&self.position);
    }
}
