use std::sync::Arc;

use banterbus_core::game_state::PausedState;
use banterbus_core::room::{Room, RoomState};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::services::GameStateService;
use crate::store::RoomRepository;

/// Room CRUD and state transitions. Pause and unpause gate on the host and
/// the room state before delegating to the game-state service.
#[derive(Clone)]
pub struct RoomService {
    rooms: Arc<dyn RoomRepository>,
}

impl RoomService {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    /// Create an empty room. A v4 UUID collision is the only way this can
    /// report `RoomExists`.
    pub async fn create(&self) -> Result<Room> {
        let room = Room::new(Uuid::new_v4().to_string());
        self.rooms.add(&room).await?;
        tracing::info!(room_id = %room.room_id, "room created");
        Ok(room)
    }

    pub async fn get(&self, room_id: &str) -> Result<Room> {
        self.rooms.get(room_id).await
    }

    pub async fn update_host(&self, room: &Room, player_id: &str) -> Result<Room> {
        let mut room = room.clone();
        room.host = Some(player_id.to_string());
        room.updated_at = Utc::now();
        self.rooms.update(&room).await
    }

    pub async fn update_game_state(&self, room: &Room, new_state: RoomState) -> Result<Room> {
        let mut room = room.clone();
        room.state = new_state;
        room.updated_at = Utc::now();
        self.rooms.update(&room).await
    }

    /// Adjust `player_count` by one in either direction.
    pub async fn update_player_count(&self, room: &Room, increment: bool) -> Result<Room> {
        let mut room = room.clone();
        room.player_count = if increment {
            room.player_count + 1
        } else {
            room.player_count.saturating_sub(1)
        };
        room.updated_at = Utc::now();
        self.rooms.update(&room).await
    }

    /// Host-initiated pause. Returns the pause ceiling in seconds.
    pub async fn pause_game(
        &self,
        room_id: &str,
        player_id: &str,
        game_state: &GameStateService,
    ) -> Result<i64> {
        let room = self.rooms.get(room_id).await?;
        check_is_host(&room, player_id)?;
        if room.state != RoomState::Playing {
            return Err(Error::RoomInInvalidState {
                expected: RoomState::Playing,
                actual: room.state,
            });
        }

        let paused_for = game_state.pause_game(room_id, None).await?;
        self.update_game_state(&room, RoomState::Paused).await?;
        Ok(paused_for)
    }

    /// Host-initiated resume. The room only returns to `Playing` when the
    /// waiting set is empty and the game actually unpaused.
    pub async fn unpause_game(
        &self,
        room_id: &str,
        player_id: &str,
        game_state: &GameStateService,
    ) -> Result<PausedState> {
        let room = self.rooms.get(room_id).await?;
        check_is_host(&room, player_id)?;
        if room.state != RoomState::Paused {
            return Err(Error::RoomInInvalidState {
                expected: RoomState::Paused,
                actual: room.state,
            });
        }

        let paused = game_state.unpause_game(room_id, None).await?;
        if !paused.is_paused {
            self.update_game_state(&room, RoomState::Playing).await?;
        }
        Ok(paused)
    }
}

fn check_is_host(room: &Room, player_id: &str) -> Result<()> {
    let host = room.host.as_ref().ok_or_else(|| Error::RoomHasNoHost {
        room_id: room.room_id.clone(),
    })?;
    if host != player_id {
        return Err(Error::PlayerNotHost {
            player_id: player_id.to_string(),
            host_player_id: host.clone(),
        });
    }
    Ok(())
}
