//! Kingside core.
//!
//! Everything the client needs to know about a chess position without knowing
//! chess rules. Rules live behind the [`Oracle`] trait; this crate only drives
//! it and projects its answers.
//!
//! # Components
//!
//! - [`Oracle`]: the move-legality and terminal-state collaborator
//! - [`BoardSnapshot`] / [`BoardView`]: 0x88 board and its render projection
//! - [`validator`]: legal targets for a drag and promotion disambiguation
//! - [`terminal`]: terminal-state detection in fixed priority
//! - [`Environment`]: time and randomness, injected for deterministic tests

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod board;
pub mod env;
pub mod error;
pub mod oracle;
pub mod piece;
pub mod terminal;
pub mod validator;

pub use board::{BoardSnapshot, BoardView, PlacedPiece};
pub use env::Environment;
pub use error::OracleError;
pub use kingside_proto::{Color, Move, PlayerInfo, Promotion, PromotionPiece, Square};
pub use oracle::{LegalMove, Oracle};
pub use piece::{Piece, PieceKind};
pub use terminal::{GameResult, Outcome, TerminalKind};
pub use validator::{PendingPromotion, Resolution};
