use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a room. Rooms never leave `Finished` or `Abandoned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomState {
    Created,
    Playing,
    Paused,
    Finished,
    Abandoned,
}

impl RoomState {
    /// New players may only join before the game starts.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Created)
    }

    /// Existing players may rejoin until the room is closed out.
    pub fn is_rejoinable(&self) -> bool {
        matches!(self, Self::Created | Self::Playing | Self::Paused)
    }

    /// A rejoining player needs the current question replayed only once the
    /// game has actually started.
    pub fn is_rejoinable_and_started(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "CREATED",
            Self::Playing => "PLAYING",
            Self::Paused => "PAUSED",
            Self::Finished => "FINISHED",
            Self::Abandoned => "ABANDONED",
        };
        f.write_str(s)
    }
}

/// A room document. The room code handed to clients is the `room_id` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,
    pub game_name: Option<String>,
    pub host: Option<String>,
    pub state: RoomState,
    pub player_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// A fresh room with no host and no players.
    pub fn new(room_id: String) -> Self {
        let now = Utc::now();
        Self {
            room_id,
            game_name: None,
            host: None,
            state: RoomState::Created,
            player_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
