//! Kingside wire protocol.
//!
//! Data model shared by both peers and the relay: squares, moves, colors and
//! player identities, the named events exchanged over the channel, and the
//! [`Frame`] envelope carrying them.
//!
//! # Encoding
//!
//! Frames and their bodies are CBOR. A frame is one of:
//!
//! - an event (`FrameKind::Event`), fire-and-forget, either direction
//! - a request (`FrameKind::Request`), expecting exactly one reply
//! - a reply (`FrameKind::Reply`), matched to its request by id
//!
//! Reply bodies always use the [`Ack`] envelope (`{success, payload?,
//! reason?}`).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod event;
mod frame;
pub mod payloads;
mod types;

pub use error::ProtoError;
pub use event::EventName;
pub use frame::{Frame, FrameKind};
pub use payloads::{
    game::{MakeMove, RemoteMove},
    session::{Ack, CreateGame, Empty, JoinGame, LeaveGame},
};
pub use types::{Color, Move, PlayerInfo, Promotion, PromotionPiece, RoomId, Square};
