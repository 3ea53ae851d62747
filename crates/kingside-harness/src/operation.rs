//! Operations for simulation testing.
//!
//! Operations represent everything a player or the network can do to the
//! simulated world. They are generated randomly by proptest (or decoded from
//! fuzzer bytes via `Arbitrary`) and applied to a [`crate::SimWorld`].

use arbitrary::Arbitrary;

/// Client identifier (0-indexed).
pub type ClientId = u8;

/// Operations that can be applied to the world.
///
/// Requests only leave the client; nothing reaches the relay until
/// [`Operation::Deliver`]. This lets proptest interleave a leave with the
/// reply to an earlier create or join.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Client hosts a new game.
    CreateGame {
        /// Client performing the operation.
        client_id: ClientId,
        /// Host plays white.
        white: bool,
    },

    /// Client joins whatever room `host_id` currently knows about.
    ///
    /// Uses a code that no room has if the host holds none.
    JoinGame {
        /// Client joining.
        client_id: ClientId,
        /// Client whose room code is used.
        host_id: ClientId,
    },

    /// Client plays one of its legal moves programmatically.
    PlayMove {
        /// Client moving.
        client_id: ClientId,
        /// Index into the legal moves, taken modulo their number.
        choice: u16,
    },

    /// Client drags one of its legal moves with the pointer.
    ///
    /// Promotions pick a queen from the selector.
    DragMove {
        /// Client moving.
        client_id: ClientId,
        /// Index into the legal moves, taken modulo their number.
        choice: u16,
    },

    /// Client leaves its game.
    LeaveGame {
        /// Client leaving.
        client_id: ClientId,
    },

    /// Advance simulation time.
    ///
    /// Expires notices whose lifetime has passed.
    AdvanceTime {
        /// Milliseconds to advance.
        millis: u16,
    },

    /// Deliver every frame in flight until the network is quiet.
    Deliver,
}

impl Operation {
    /// Client the operation acts for, if any.
    pub fn client_id(&self) -> Option<ClientId> {
        match self {
            Self::CreateGame { client_id, .. }
            | Self::JoinGame { client_id, .. }
            | Self::PlayMove { client_id, .. }
            | Self::DragMove { client_id, .. }
            | Self::LeaveGame { client_id } => Some(*client_id),
            Self::AdvanceTime { .. } | Self::Deliver => None,
        }
    }
}

/// Result of applying an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,

    /// Operation failed with expected error.
    Error(OperationError),
}

/// Expected errors that can occur during operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// Invalid client ID.
    InvalidClient,

    /// A create or join is already waiting for its reply.
    RequestPending,

    /// The session does not allow this right now.
    InvalidState,

    /// It is the opponent's move.
    NotYourTurn,

    /// The side to move has no legal move.
    NoLegalMove,

    /// The client ignored or refused the input.
    Rejected,
}

impl OperationResult {
    /// Check if operation succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, OperationResult::Ok)
    }

    /// Check if operation failed.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}
