//! Named events.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ProtoError;

/// Every event name used on the channel.
///
/// `Connect` and `Disconnect` never travel on the wire; the transport
/// synthesizes them from connection lifecycle changes so subscribers can treat
/// them like any other event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventName {
    /// Request a new room (client to relay, acknowledged).
    CreateGame,
    /// Request to join a room by code (client to relay, acknowledged).
    JoinGame,
    /// Leave the current room (client to relay, acknowledged).
    LeaveGame,
    /// A move, relayed to the other player of the room.
    MakeMove,
    /// The other player entered the room.
    OpponentConnected,
    /// The other player left or dropped.
    OpponentDisconnected,
    /// Transport connected.
    Connect,
    /// Transport disconnected.
    Disconnect,
}

impl EventName {
    /// All event names, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::CreateGame,
        Self::JoinGame,
        Self::LeaveGame,
        Self::MakeMove,
        Self::OpponentConnected,
        Self::OpponentDisconnected,
        Self::Connect,
        Self::Disconnect,
    ];

    /// Wire name of the event.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateGame => "create-game",
            Self::JoinGame => "join-game",
            Self::LeaveGame => "leave-game",
            Self::MakeMove => "make-move",
            Self::OpponentConnected => "opponent-connected",
            Self::OpponentDisconnected => "opponent-disconnected",
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
        }
    }

    /// True for the lifecycle events synthesized by the transport.
    pub fn is_lifecycle(self) -> bool {
        matches!(self, Self::Connect | Self::Disconnect)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ProtoError::UnknownEvent(s.to_string()))
    }
}
