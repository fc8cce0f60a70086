//! Persistence contract for rooms, players and game states.
//!
//! Three collections keyed by stable ids, with uniqueness enforced on the
//! key. [`MemoryStore`] backs the tests; [`MongoStore`] backs production.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use banterbus_core::game_state::GameState;
use banterbus_core::player::Player;
use banterbus_core::room::Room;

use crate::error::Result;

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Insert a new room. Fails with `RoomExists` on a `room_id` collision.
    async fn add(&self, room: &Room) -> Result<()>;

    /// Fetch a room or fail with `RoomNotFound`.
    async fn get(&self, room_id: &str) -> Result<Room>;

    /// Replace the stored document for this `room_id`.
    async fn update(&self, room: &Room) -> Result<Room>;
}

#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Insert a new player. Fails with `PlayerExists` on a `player_id`
    /// collision.
    async fn add(&self, player: &Player) -> Result<()>;

    /// Fetch a player or fail with `PlayerNotFound`.
    async fn get(&self, player_id: &str) -> Result<Player>;

    /// The player currently holding this session id, if any.
    async fn get_by_sid(&self, sid: &str) -> Result<Option<Player>>;

    async fn get_by_nickname(&self, room_id: &str, nickname: &str) -> Result<Option<Player>>;

    async fn get_all_in_room(&self, room_id: &str) -> Result<Vec<Player>>;

    /// All players with a `disconnected_at` stamp, in any room.
    async fn get_disconnected(&self) -> Result<Vec<Player>>;

    /// Replace the stored document for this `player_id`.
    async fn update(&self, player: &Player) -> Result<Player>;
}

#[async_trait]
pub trait GameStateRepository: Send + Sync {
    /// Insert a new game state. Fails with `GameStateExists` on a
    /// `room_id` collision.
    async fn add(&self, game_state: &GameState) -> Result<()>;

    /// Fetch the game state for a room or fail with `GameStateNotFound`.
    async fn get(&self, room_id: &str) -> Result<GameState>;

    /// Replace the stored document for this `room_id`.
    async fn update(&self, game_state: &GameState) -> Result<GameState>;
}
