//! Client configuration.

use std::time::Duration;

use kingside_core::Square;

/// Default edge length of one square in pixels.
pub const DEFAULT_SQUARE_SIZE: f32 = 64.0;

/// Default lifetime of a notice.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Board size and orientation as drawn by the caller.
///
/// The board covers `8 * square_size` pixels in both axes with the origin at
/// the top-left corner. Unflipped, a8 is top-left; flipped, h1 is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    /// Edge length of one square in pixels.
    pub square_size: f32,
    /// Board drawn from black's side.
    pub flipped: bool,
}

impl BoardGeometry {
    /// Edge length of the whole board.
    pub fn board_size(&self) -> f32 {
        self.square_size * 8.0
    }

    /// Clamp a pointer position to the board.
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        let size = self.board_size();
        (x.clamp(0.0, size), y.clamp(0.0, size))
    }

    /// Square under a pixel position, `None` off the board.
    pub fn square_at(&self, x: f32, y: f32) -> Option<Square> {
        if !(x.is_finite() && y.is_finite()) || self.square_size <= 0.0 {
            return None;
        }
        let size = self.board_size();
        if x < 0.0 || y < 0.0 || x > size || y > size {
            return None;
        }
        // The far edge belongs to the last square.
        let col = cell(x / self.square_size);
        let row = cell(y / self.square_size);

        if self.flipped { Square::new(7 - col, row) } else { Square::new(col, 7 - row) }
    }

    /// Top-left pixel of `square`.
    pub fn origin_of(&self, square: Square) -> (f32, f32) {
        let (col, row) = if self.flipped {
            (7 - square.file(), square.rank())
        } else {
            (square.file(), 7 - square.rank())
        };
        (f32::from(col) * self.square_size, f32::from(row) * self.square_size)
    }

    /// Centre pixel of `square`.
    pub fn centre_of(&self, square: Square) -> (f32, f32) {
        let (x, y) = self.origin_of(square);
        let half = self.square_size / 2.0;
        (x + half, y + half)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cell(scaled: f32) -> u8 {
    scaled.floor().clamp(0.0, 7.0) as u8
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self { square_size: DEFAULT_SQUARE_SIZE, flipped: false }
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// How the board is drawn.
    pub geometry: BoardGeometry,

    /// How long a notice stays up.
    ///
    /// Default: 3 seconds
    pub notice_ttl: Duration,

    /// Starting position in FEN, standard initial position if `None`.
    ///
    /// Read by whoever builds the oracle; the client never parses it.
    pub initial_fen: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { geometry: BoardGeometry::default(), notice_ttl: DEFAULT_NOTICE_TTL, initial_fen: None }
    }
}
