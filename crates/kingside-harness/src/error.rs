//! Harness errors.

use kingside_client::ClientError;
use kingside_core::OracleError;
use kingside_proto::ProtoError;

use crate::ClientId;

/// Failures that stop a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// A frame could not cross the simulated wire.
    #[error("wire: {0}")]
    Wire(#[from] ProtoError),

    /// A client rejected an event it should have accepted.
    #[error("client {client}: {source}")]
    Client {
        /// Which client.
        client: ClientId,
        /// Underlying error.
        source: ClientError,
    },

    /// The starting position could not be loaded.
    #[error("start position: {0}")]
    Position(#[from] OracleError),

    /// Text that should have been a move.
    #[error("bad move '{input}': {reason}")]
    BadMove {
        /// Offending text.
        input: String,
        /// What was wrong.
        reason: String,
    },

    /// Frames kept flowing past the delivery bound.
    #[error("delivery did not settle after {rounds} rounds")]
    Unsettled {
        /// Rounds attempted.
        rounds: usize,
    },

    /// A client expected to hold a room code has none.
    #[error("client {0} holds no room")]
    NoRoom(ClientId),

    /// Operation named a client that does not exist.
    #[error("no client {0}")]
    UnknownClient(ClientId),
}
