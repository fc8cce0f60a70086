use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::avatar;

/// A player document. `latest_sid` is rewritten on every (re)connect;
/// `disconnected_at` is set on socket loss and cleared on rejoin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub nickname: String,
    #[serde(with = "avatar")]
    pub avatar: Vec<u8>,
    pub room_id: Option<String>,
    pub latest_sid: String,
    pub disconnected_at: Option<DateTime<Utc>>,
}

/// Input for creating a player; the service allocates the `player_id`.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub nickname: String,
    pub avatar: Vec<u8>,
    pub latest_sid: String,
}

/// The membership view returned by lobby join/rejoin.
#[derive(Debug, Clone)]
pub struct RoomPlayers {
    pub players: Vec<Player>,
    pub host_player_nickname: String,
    pub player_id: String,
    pub room_code: String,
}
