//! Session management payload types.
//!
//! These payloads handle the room lifecycle: creating a room, joining it by
//! code, and leaving it.

use serde::{Deserialize, Serialize};

use crate::{Color, RoomId};

/// Request a new room (`create-game`).
///
/// The relay replies with `Ack<RoomId>`; the creator plays `color`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGame {
    /// Color the creator wants to play.
    pub color: Color,
    /// Creator display name.
    pub name: String,
}

/// Request to join a room (`join-game`).
///
/// The relay replies with `Ack<PlayerInfo>` describing the host. The joiner
/// plays the complement of the host's color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGame {
    /// Code of the room to join.
    pub room_id: RoomId,
    /// Joiner display name.
    pub name: String,
}

/// Leave a room (`leave-game`).
///
/// Acknowledged with an empty `Ack`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveGame {
    /// Room being left.
    pub room_id: RoomId,
}

/// Body for events without data (`opponent-disconnected`, `leave-game`
/// replies).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Reply envelope for every acknowledged request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack<T> {
    /// Whether the request was honored.
    pub success: bool,
    /// Result data on success.
    #[serde(skip_serializing_if = "Option::is_none", default = "Option::default")]
    pub payload: Option<T>,
    /// Failure reason (for logging/notices).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
}

impl<T> Ack<T> {
    /// Successful reply.
    pub fn ok(payload: T) -> Self {
        Self { success: true, payload: Some(payload), reason: None }
    }

    /// Failed reply.
    pub fn err(reason: impl Into<String>) -> Self {
        Self { success: false, payload: None, reason: Some(reason.into()) }
    }

    /// Payload of a successful reply. `None` on failure or missing payload.
    pub fn into_payload(self) -> Option<T> {
        if self.success { self.payload } else { None }
    }
}
