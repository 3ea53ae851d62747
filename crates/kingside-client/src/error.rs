//! Client error types.

use kingside_core::OracleError;
use kingside_proto::{EventName, ProtoError};
use thiserror::Error;

/// Errors from the event channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Nothing can be sent while the transport is down.
    #[error("channel disconnected, cannot send {name}")]
    Disconnected {
        /// Event that was not sent.
        name: EventName,
    },

    /// Payload could not be encoded.
    #[error("codec error: {0}")]
    Codec(#[from] ProtoError),
}

impl ChannelError {
    /// Returns true if this error is fatal (unrecoverable).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Codec(_))
    }
}

/// Errors from client operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Sending failed.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Oracle rejected a move.
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Frame body could not be decoded.
    #[error("invalid frame: {0}")]
    Proto(#[from] ProtoError),

    /// Client is in an invalid state for the operation.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Description of the state error.
        reason: String,
    },

    /// A move was attempted while the opponent is to move.
    #[error("not your turn")]
    NotYourTurn,

    /// A create or join request is still awaiting its reply.
    #[error("request pending: {request}")]
    RequestPending {
        /// The outstanding request.
        request: EventName,
    },
}

impl ClientError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Fatal errors indicate protocol violations or bugs. Transient errors
    /// leave the client usable.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Proto(_) | Self::InvalidState { .. } => true,

            Self::Channel(e) => e.is_fatal(),

            Self::Oracle(_) | Self::NotYourTurn | Self::RequestPending { .. } => false,
        }
    }

    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_is_transient() {
        let err = ClientError::from(ChannelError::Disconnected { name: EventName::MakeMove });
        assert!(!err.is_fatal());
    }

    #[test]
    fn decode_failure_is_fatal() {
        let err = ClientError::Proto(ProtoError::Decode("truncated".to_string()));
        assert!(err.is_fatal());
    }

    #[test]
    fn pending_request_is_transient() {
        let err = ClientError::RequestPending { request: EventName::JoinGame };
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "request pending: join-game");
    }

    #[test]
    fn error_display() {
        let err = ClientError::invalid_state("game over");
        assert_eq!(err.to_string(), "invalid state: game over");
    }
}
