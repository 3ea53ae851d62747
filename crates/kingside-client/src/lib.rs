//! Kingside client
//!
//! Action-based client state machine for two-player real-time chess. Turns
//! pointer input into moves, keeps the session in step with the relay, and
//! tells the caller what to draw and send.
//!
//! # Architecture
//!
//! The client is a pure state machine that:
//! - Receives events from the caller (pointer input, frames, ticks, intents)
//! - Produces actions for the caller to execute (send frames, redraw, notify)
//! - Uses the `Environment` trait for time and randomness
//!
//! # Components
//!
//! - [`Client`]: Top-level state machine owning the oracle
//! - [`InputController`]: Drag-and-drop state machine
//! - [`GameSession`]: Session lifecycle and move relay
//! - [`SyncChannel`]: Frame building, acknowledgements and event subscribers
//! - [`NoticeBoard`]: Transient user notices

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod channel;
mod client;
mod config;
mod error;
mod event;
mod input;
mod notice;
mod session;

pub use channel::{SubscriptionId, SyncChannel};
pub use client::Client;
pub use config::{BoardGeometry, ClientConfig, DEFAULT_NOTICE_TTL, DEFAULT_SQUARE_SIZE};
pub use error::{ChannelError, ClientError};
pub use event::{ClientAction, ClientEvent};
pub use input::{DragState, InputController, InputOutcome, InputState, InteractionMode};
pub use kingside_core::{Environment, Oracle};
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use session::{CONNECTION_LOST_NOTICE, GameSession, OPPONENT_JOINED_NOTICE, SessionStatus};
