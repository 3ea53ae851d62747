//! Conversions between the client's types and shakmaty's.

use kingside_core::{Color, Piece, PieceKind, PromotionPiece, Square};
use shakmaty::{File, Move, Rank, Role};

pub(crate) fn to_shakmaty(square: Square) -> shakmaty::Square {
    shakmaty::Square::from_coords(
        File::new(u32::from(square.file())),
        Rank::new(u32::from(square.rank())),
    )
}

/// Both sides print squares in algebraic notation.
pub(crate) fn from_shakmaty(square: shakmaty::Square) -> Option<Square> {
    square.to_string().parse().ok()
}

pub(crate) fn color(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

pub(crate) fn piece(piece: shakmaty::Piece) -> Piece {
    let kind = match piece.role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    };
    Piece::new(kind, color(piece.color))
}

pub(crate) fn role(piece: PromotionPiece) -> Role {
    match piece {
        PromotionPiece::Queen => Role::Queen,
        PromotionPiece::Rook => Role::Rook,
        PromotionPiece::Bishop => Role::Bishop,
        PromotionPiece::Knight => Role::Knight,
    }
}

/// Origin, destination and promotion role of a shakmaty move.
///
/// Castling is reported as the king's two-square step, not as king-takes-rook.
pub(crate) fn endpoints(mv: &Move) -> Option<(shakmaty::Square, shakmaty::Square, Option<Role>)> {
    match mv {
        Move::Normal { from, to, promotion, .. } => Some((*from, *to, *promotion)),
        Move::EnPassant { from, to } => Some((*from, *to, None)),
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            Some((*king, shakmaty::Square::from_coords(file, king.rank()), None))
        },
        _ => None,
    }
}
