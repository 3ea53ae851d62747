//! Chess data model shared on the wire.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ProtoError;

/// Room code assigned by the relay (short, human-shareable).
pub type RoomId = String;

/// Player color.
///
/// Encoded on the wire as `"w"` / `"b"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// White, moves first.
    #[serde(rename = "w")]
    White,
    /// Black.
    #[serde(rename = "b")]
    Black,
}

impl Color {
    /// The other color.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Rank (0-indexed) a pawn of this color promotes on.
    pub fn promotion_rank(self) -> u8 {
        match self {
            Self::White => 7,
            Self::Black => 0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::White => "white",
            Self::Black => "black",
        })
    }
}

/// Board cell addressed by file and rank, both 0-indexed.
///
/// `file` 0 is the a-file, `rank` 0 is the first rank. Serialized as
/// algebraic notation (`"e4"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Create a square. `None` if either coordinate is outside `0..8`.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// File, 0 = a.
    pub fn file(self) -> u8 {
        self.file
    }

    /// Rank, 0 = first rank.
    pub fn rank(self) -> u8 {
        self.rank
    }

    /// Dense index `0..64`, a1 = 0, h8 = 63.
    pub fn index(self) -> usize {
        usize::from(self.rank) * 8 + usize::from(self.file)
    }

    /// Inverse of [`Square::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= 64 {
            return None;
        }
        Self::new((index % 8) as u8, (index / 8) as u8)
    }

    /// Index in the padded 16-column (0x88) layout.
    pub fn to_0x88(self) -> usize {
        usize::from(self.rank) * 16 + usize::from(self.file)
    }

    /// Square for a 0x88 index, `None` for padding cells.
    pub fn from_0x88(index: usize) -> Option<Self> {
        if index >= 128 || index & 0x88 != 0 {
            return None;
        }
        Self::new((index & 7) as u8, (index >> 4) as u8)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", char::from(b'a' + self.file), self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let &[file, rank] = s.as_bytes() else {
            return Err(ProtoError::InvalidSquare(s.to_string()));
        };
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ProtoError::InvalidSquare(s.to_string()));
        }
        Ok(Self { file: file - b'a', rank: rank - b'1' })
    }
}

impl TryFrom<String> for Square {
    type Error = ProtoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

/// Piece a pawn may promote to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionPiece {
    /// Queen.
    Queen,
    /// Rook.
    Rook,
    /// Bishop.
    Bishop,
    /// Knight.
    Knight,
}

impl PromotionPiece {
    /// Selector order offered to the player.
    pub const ALL: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    fn lowercase(self) -> char {
        match self {
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
        }
    }
}

/// Promotion choice as the oracle expects it.
///
/// The character is color-sensitive: uppercase for white, lowercase for
/// black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Promotion {
    /// Chosen piece.
    pub piece: PromotionPiece,
    /// Color of the promoting pawn.
    pub color: Color,
}

impl Promotion {
    /// Encoded character.
    pub fn as_char(self) -> char {
        let c = self.piece.lowercase();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

impl TryFrom<char> for Promotion {
    type Error = ProtoError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        let piece = PromotionPiece::ALL
            .into_iter()
            .find(|p| p.lowercase() == c.to_ascii_lowercase())
            .ok_or(ProtoError::InvalidPromotion(c))?;
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        Ok(Self { piece, color })
    }
}

impl From<Promotion> for char {
    fn from(promotion: Promotion) -> Self {
        promotion.as_char()
    }
}

/// A move as exchanged between peers and handed to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Origin square.
    pub from: Square,
    /// Destination square. For castling this is the king's destination.
    pub to: Square,
    /// Promotion choice, present only for promoting pawn moves.
    #[serde(rename = "promotion_piece", skip_serializing_if = "Option::is_none", default)]
    pub promotion: Option<Promotion>,
}

impl Move {
    /// A non-promoting move.
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to, promotion: None }
    }

    /// A promoting move.
    pub fn with_promotion(from: Square, to: Square, promotion: Promotion) -> Self {
        Self { from, to, promotion: Some(promotion) }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.as_char())?;
        }
        Ok(())
    }
}

/// Public identity of a player in a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Display name.
    pub name: String,
    /// Color the player plays.
    pub color: Color,
}
