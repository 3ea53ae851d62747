//! Oracle error types.

use kingside_proto::Move;
use thiserror::Error;

/// Errors reported by an [`crate::Oracle`].
///
/// Oracle mutation is atomic-or-no-op: after any of these the position is
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The move is not legal in the current position.
    #[error("illegal move {mv} in current position")]
    IllegalMove {
        /// The rejected move.
        mv: Move,
    },

    /// A position could not be loaded.
    #[error("invalid position: {reason}")]
    InvalidPosition {
        /// Parser or validation failure.
        reason: String,
    },
}
