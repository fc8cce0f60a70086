use std::collections::HashMap;

use async_trait::async_trait;
use banterbus_core::game_state::GameState;
use banterbus_core::player::Player;
use banterbus_core::room::Room;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::store::{GameStateRepository, PlayerRepository, RoomRepository};

/// In-memory store with the same uniqueness semantics as the Mongo-backed
/// one. Backs the test suites; never authoritative in production.
#[derive(Default)]
pub struct MemoryStore {
    rooms: RwLock<HashMap<String, Room>>,
    players: RwLock<HashMap<String, Player>>,
    game_states: RwLock<HashMap<String, GameState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn add(&self, room: &Room) -> Result<()> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.room_id) {
            return Err(Error::RoomExists {
                room_id: room.room_id.clone(),
            });
        }
        rooms.insert(room.room_id.clone(), room.clone());
        Ok(())
    }

    async fn get(&self, room_id: &str) -> Result<Room> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| Error::RoomNotFound {
                room_id: room_id.to_string(),
            })
    }

    async fn update(&self, room: &Room) -> Result<Room> {
        let mut rooms = self.rooms.write().await;
        if !rooms.contains_key(&room.room_id) {
            return Err(Error::RoomNotFound {
                room_id: room.room_id.clone(),
            });
        }
        rooms.insert(room.room_id.clone(), room.clone());
        Ok(room.clone())
    }
}

#[async_trait]
impl PlayerRepository for MemoryStore {
    async fn add(&self, player: &Player) -> Result<()> {
        let mut players = self.players.write().await;
        if players.contains_key(&player.player_id) {
            return Err(Error::PlayerExists {
                player_id: player.player_id.clone(),
            });
        }
        players.insert(player.player_id.clone(), player.clone());
        Ok(())
    }

    async fn get(&self, player_id: &str) -> Result<Player> {
        self.players
            .read()
            .await
            .get(player_id)
            .cloned()
            .ok_or_else(|| Error::PlayerNotFound {
                player_id: player_id.to_string(),
            })
    }

    async fn get_by_sid(&self, sid: &str) -> Result<Option<Player>> {
        Ok(self
            .players
            .read()
            .await
            .values()
            .find(|p| p.latest_sid == sid)
            .cloned())
    }

    async fn get_by_nickname(&self, room_id: &str, nickname: &str) -> Result<Option<Player>> {
        Ok(self
            .players
            .read()
            .await
            .values()
            .find(|p| p.room_id.as_deref() == Some(room_id) && p.nickname == nickname)
            .cloned())
    }

    async fn get_all_in_room(&self, room_id: &str) -> Result<Vec<Player>> {
        let mut players: Vec<Player> = self
            .players
            .read()
            .await
            .values()
            .filter(|p| p.room_id.as_deref() == Some(room_id))
            .cloned()
            .collect();
        // Stable order keeps host lookups and membership lists deterministic.
        players.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        Ok(players)
    }

    async fn get_disconnected(&self) -> Result<Vec<Player>> {
        Ok(self
            .players
            .read()
            .await
            .values()
            .filter(|p| p.disconnected_at.is_some())
            .cloned()
            .collect())
    }

    async fn update(&self, player: &Player) -> Result<Player> {
        let mut players = self.players.write().await;
        if !players.contains_key(&player.player_id) {
            return Err(Error::PlayerNotFound {
                player_id: player.player_id.clone(),
            });
        }
        players.insert(player.player_id.clone(), player.clone());
        Ok(player.clone())
    }
}

#[async_trait]
impl GameStateRepository for MemoryStore {
    async fn add(&self, game_state: &GameState) -> Result<()> {
        let mut game_states = self.game_states.write().await;
        if game_states.contains_key(&game_state.room_id) {
            return Err(Error::GameStateExists {
                room_id: game_state.room_id.clone(),
            });
        }
        game_states.insert(game_state.room_id.clone(), game_state.clone());
        Ok(())
    }

    async fn get(&self, room_id: &str) -> Result<GameState> {
        self.game_states
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| Error::GameStateNotFound {
                room_id: room_id.to_string(),
            })
    }

    async fn update(&self, game_state: &GameState) -> Result<GameState> {
        let mut game_states = self.game_states.write().await;
        if !game_states.contains_key(&game_state.room_id) {
            return Err(Error::GameStateNotFound {
                room_id: game_state.room_id.clone(),
            });
        }
        game_states.insert(game_state.room_id.clone(), game_state.clone());
        Ok(game_state.clone())
    }
}
