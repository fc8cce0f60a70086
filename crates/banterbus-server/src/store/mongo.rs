use async_trait::async_trait;
use banterbus_core::game_state::GameState;
use banterbus_core::player::Player;
use banterbus_core::room::Room;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

use crate::error::{Error, Result};
use crate::store::{GameStateRepository, PlayerRepository, RoomRepository};

/// Mongo error code for a unique-index violation.
const DUPLICATE_KEY: i32 = 11000;

/// Document store backed by MongoDB. One collection per aggregate, each with
/// a unique index on its key.
#[derive(Clone)]
pub struct MongoStore {
    rooms: Collection<Room>,
    players: Collection<Player>,
    game_states: Collection<GameState>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            rooms: db.collection("rooms"),
            players: db.collection("players"),
            game_states: db.collection("game_states"),
        }
    }

    /// Create the unique key indexes. Run once at startup; creating an index
    /// that already exists is a no-op on the server side.
    pub async fn ensure_indexes(&self) -> Result<()> {
        self.rooms
            .create_index(unique_index("room_id"))
            .await
            .map_err(store_error)?;
        self.players
            .create_index(unique_index("player_id"))
            .await
            .map_err(store_error)?;
        self.game_states
            .create_index(unique_index("room_id"))
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

fn unique_index(field: &str) -> IndexModel {
    IndexModel::builder()
        .keys(doc! { field: 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn store_error(e: mongodb::error::Error) -> Error {
    Error::Store(e.to_string())
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteError, WriteFailure};
    matches!(
        &*e.kind,
        ErrorKind::Write(WriteFailure::WriteError(WriteError { code, .. })) if *code == DUPLICATE_KEY
    )
}

#[async_trait]
impl RoomRepository for MongoStore {
    async fn add(&self, room: &Room) -> Result<()> {
        self.rooms.insert_one(room).await.map_err(|e| {
            if is_duplicate_key(&e) {
                Error::RoomExists {
                    room_id: room.room_id.clone(),
                }
            } else {
                store_error(e)
            }
        })?;
        Ok(())
    }

    async fn get(&self, room_id: &str) -> Result<Room> {
        self.rooms
            .find_one(doc! { "room_id": room_id })
            .await
            .map_err(store_error)?
            .ok_or_else(|| Error::RoomNotFound {
                room_id: room_id.to_string(),
            })
    }

    async fn update(&self, room: &Room) -> Result<Room> {
        let result = self
            .rooms
            .replace_one(doc! { "room_id": &room.room_id }, room)
            .await
            .map_err(store_error)?;
        if result.matched_count == 0 {
            return Err(Error::RoomNotFound {
                room_id: room.room_id.clone(),
            });
        }
        Ok(room.clone())
    }
}

#[async_trait]
impl PlayerRepository for MongoStore {
    async fn add(&self, player: &Player) -> Result<()> {
        self.players.insert_one(player).await.map_err(|e| {
            if is_duplicate_key(&e) {
                Error::PlayerExists {
                    player_id: player.player_id.clone(),
                }
            } else {
                store_error(e)
            }
        })?;
        Ok(())
    }

    async fn get(&self, player_id: &str) -> Result<Player> {
        self.players
            .find_one(doc! { "player_id": player_id })
            .await
            .map_err(store_error)?
            .ok_or_else(|| Error::PlayerNotFound {
                player_id: player_id.to_string(),
            })
    }

    async fn get_by_sid(&self, sid: &str) -> Result<Option<Player>> {
        self.players
            .find_one(doc! { "latest_sid": sid })
            .await
            .map_err(store_error)
    }

    async fn get_by_nickname(&self, room_id: &str, nickname: &str) -> Result<Option<Player>> {
        self.players
            .find_one(doc! { "room_id": room_id, "nickname": nickname })
            .await
            .map_err(store_error)
    }

    async fn get_all_in_room(&self, room_id: &str) -> Result<Vec<Player>> {
        self.players
            .find(doc! { "room_id": room_id })
            .sort(doc! { "player_id": 1 })
            .await
            .map_err(store_error)?
            .try_collect()
            .await
            .map_err(store_error)
    }

    async fn get_disconnected(&self) -> Result<Vec<Player>> {
        self.players
            .find(doc! { "disconnected_at": { "$ne": null } })
            .await
            .map_err(store_error)?
            .try_collect()
            .await
            .map_err(store_error)
    }

    async fn update(&self, player: &Player) -> Result<Player> {
        let result = self
            .players
            .replace_one(doc! { "player_id": &player.player_id }, player)
            .await
            .map_err(store_error)?;
        if result.matched_count == 0 {
            return Err(Error::PlayerNotFound {
                player_id: player.player_id.clone(),
            });
        }
        Ok(player.clone())
    }
}

#[async_trait]
impl GameStateRepository for MongoStore {
    async fn add(&self, game_state: &GameState) -> Result<()> {
        self.game_states.insert_one(game_state).await.map_err(|e| {
            if is_duplicate_key(&e) {
                Error::GameStateExists {
                    room_id: game_state.room_id.clone(),
                }
            } else {
                store_error(e)
            }
        })?;
        Ok(())
    }

    async fn get(&self, room_id: &str) -> Result<GameState> {
        self.game_states
            .find_one(doc! { "room_id": room_id })
            .await
            .map_err(store_error)?
            .ok_or_else(|| Error::GameStateNotFound {
                room_id: room_id.to_string(),
            })
    }

    async fn update(&self, game_state: &GameState) -> Result<GameState> {
        let result = self
            .game_states
            .replace_one(doc! { "room_id": &game_state.room_id }, game_state)
            .await
            .map_err(store_error)?;
        if result.matched_count == 0 {
            return Err(Error::GameStateNotFound {
                room_id: game_state.room_id.clone(),
            });
        }
        Ok(game_state.clone())
    }
}
