//! Board snapshot and its render projection.
//!
//! The oracle exposes the board in the classic padded 16-column (0x88)
//! layout: 128 cells, of which only those with `(index & 0x88) == 0` are real
//! squares. [`BoardSnapshot::project`] is the only place that turns this into
//! something a renderer can draw, and it is recomputed after every applied
//! move rather than edited in place.

use kingside_proto::{Color, Square};

use crate::{Piece, PieceKind};

/// Number of cells in the padded layout.
pub const PADDED_CELLS: usize = 128;

/// Board as reported by the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    cells: [Option<Piece>; PADDED_CELLS],
    /// Color to move.
    pub side_to_move: Color,
}

impl BoardSnapshot {
    /// Board with no pieces.
    pub fn empty(side_to_move: Color) -> Self {
        Self { cells: [None; PADDED_CELLS], side_to_move }
    }

    /// Board from raw padded cells.
    ///
    /// Padding cells are kept as given; [`BoardSnapshot::project`] ignores
    /// them.
    pub fn from_cells(cells: [Option<Piece>; PADDED_CELLS], side_to_move: Color) -> Self {
        Self { cells, side_to_move }
    }

    /// Piece on `square`.
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.cells[square.to_0x88()]
    }

    /// Place or clear `square`.
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.cells[square.to_0x88()] = piece;
    }

    /// Renderable piece list, a1 first, h8 last.
    pub fn project(&self) -> BoardView {
        let pieces = self
            .cells
            .iter()
            .enumerate()
            .filter(|(index, _)| index & 0x88 == 0)
            .filter_map(|(index, cell)| {
                let piece = (*cell)?;
                let square = Square::from_0x88(index)?;
                Some(PlacedPiece { square, kind: piece.kind, color: piece.color })
            })
            .collect();

        BoardView { pieces, side_to_move: self.side_to_move }
    }
}

/// One drawable piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPiece {
    /// Where it stands.
    pub square: Square,
    /// What it is.
    pub kind: PieceKind,
    /// Whose it is.
    pub color: Color,
}

/// What the renderer draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// Pieces in ascending board order.
    pub pieces: Vec<PlacedPiece>,
    /// Color to move.
    pub side_to_move: Color,
}

impl BoardView {
    /// Piece drawn on `square`.
    pub fn piece_at(&self, square: Square) -> Option<&PlacedPiece> {
        self.pieces.iter().find(|p| p.square == square)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn projection_skips_padding_cells() {
        let mut cells = [None; PADDED_CELLS];
        // Garbage in the padding half of every row must never render.
        for rank in 0..8 {
            cells[rank * 16 + 8] = Some(Piece::new(PieceKind::Queen, Color::Black));
        }
        cells[sq("e1").to_0x88()] = Some(Piece::new(PieceKind::King, Color::White));

        let view = BoardSnapshot::from_cells(cells, Color::White).project();

        assert_eq!(view.pieces.len(), 1);
        assert_eq!(view.pieces[0].square, sq("e1"));
        assert_eq!(view.pieces[0].kind, PieceKind::King);
    }

    #[test]
    fn projection_orders_a1_to_h8() {
        let mut board = BoardSnapshot::empty(Color::Black);
        board.set(sq("h8"), Some(Piece::new(PieceKind::Rook, Color::Black)));
        board.set(sq("a1"), Some(Piece::new(PieceKind::Rook, Color::White)));
        board.set(sq("d4"), Some(Piece::new(PieceKind::Knight, Color::White)));

        let view = board.project();
        let squares: Vec<_> = view.pieces.iter().map(|p| p.square.to_string()).collect();

        assert_eq!(squares, vec!["a1", "d4", "h8"]);
        assert_eq!(view.side_to_move, Color::Black);
    }

    #[test]
    fn set_and_clear() {
        let mut board = BoardSnapshot::empty(Color::White);
        let pawn = Piece::new(PieceKind::Pawn, Color::White);
        board.set(sq("e2"), Some(pawn));
        assert_eq!(board.get(sq("e2")), Some(pawn));
        board.set(sq("e2"), None);
        assert!(board.project().pieces.is_empty());
    }

    proptest! {
        #[test]
        fn projection_lists_every_placed_piece_once(
            occupied in prop::collection::btree_set(0usize..64, 0..32)
        ) {
            let mut board = BoardSnapshot::empty(Color::White);
            for &index in &occupied {
                let square = Square::from_index(index).unwrap();
                board.set(square, Some(Piece::new(PieceKind::Knight, Color::Black)));
            }

            let squares: Vec<usize> = board.project().pieces.iter().map(|p| p.square.index()).collect();
            let expected: Vec<usize> = occupied.into_iter().collect();
            prop_assert_eq!(squares, expected);
        }
    }
}
