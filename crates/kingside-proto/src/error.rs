//! Protocol error types.

use thiserror::Error;

/// Errors from decoding or encoding wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtoError {
    /// CBOR serialization failed.
    #[error("CBOR encode failed: {0}")]
    Encode(String),

    /// CBOR deserialization failed.
    #[error("CBOR decode failed: {0}")]
    Decode(String),

    /// Square notation is not `[a-h][1-8]`.
    #[error("invalid square: {0:?}")]
    InvalidSquare(String),

    /// Promotion character is not one of `QRBNqrbn`.
    #[error("invalid promotion piece: {0:?}")]
    InvalidPromotion(char),

    /// Event name is not part of the protocol.
    #[error("unknown event: {0:?}")]
    UnknownEvent(String),
}

impl ProtoError {
    /// Returns true if the error came from malformed peer data rather than a
    /// local encoding failure.
    pub fn is_peer_fault(&self) -> bool {
        !matches!(self, Self::Encode(_))
    }
}
