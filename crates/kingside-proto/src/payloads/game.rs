//! In-game payload types.

use serde::{Deserialize, Serialize};

use crate::{Move, RoomId};

/// Outbound move (`make-move`, client to relay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeMove {
    /// The move just played locally.
    #[serde(rename = "move")]
    pub mv: Move,
    /// Room to relay it to.
    pub room_id: RoomId,
}

/// Inbound move (`make-move`, relay to the other player).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMove {
    /// The opponent's move.
    #[serde(rename = "move")]
    pub mv: Move,
}

impl From<MakeMove> for RemoteMove {
    fn from(outbound: MakeMove) -> Self {
        Self { mv: outbound.mv }
    }
}
