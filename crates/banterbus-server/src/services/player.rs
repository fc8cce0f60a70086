use std::sync::Arc;

use banterbus_core::player::{NewPlayer, Player};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::PlayerRepository;

/// CRUD over players plus the disconnect clock.
#[derive(Clone)]
pub struct PlayerService {
    players: Arc<dyn PlayerRepository>,
}

impl PlayerService {
    pub fn new(players: Arc<dyn PlayerRepository>) -> Self {
        Self { players }
    }

    pub async fn create(&self, room_id: &str, new_player: NewPlayer) -> Result<Player> {
        let player = Player {
            player_id: Uuid::new_v4().to_string(),
            nickname: new_player.nickname,
            avatar: new_player.avatar,
            room_id: Some(room_id.to_string()),
            latest_sid: new_player.latest_sid,
            disconnected_at: None,
        };
        self.players.add(&player).await?;
        Ok(player)
    }

    pub async fn get(&self, player_id: &str) -> Result<Player> {
        self.players.get(player_id).await
    }

    pub async fn get_by_sid(&self, sid: &str) -> Result<Option<Player>> {
        self.players.get_by_sid(sid).await
    }

    pub async fn get_all_in_room(&self, room_id: &str) -> Result<Vec<Player>> {
        self.players.get_all_in_room(room_id).await
    }

    /// Detach a player from their room by nickname. Host succession is the
    /// caller's concern.
    pub async fn remove_from_room(&self, nickname: &str, room_id: &str) -> Result<Player> {
        let mut player = self
            .players
            .get_by_nickname(room_id, nickname)
            .await?
            .ok_or_else(|| Error::PlayerNotFound {
                player_id: nickname.to_string(),
            })?;
        player.room_id = None;
        self.players.update(&player).await
    }

    pub async fn update_latest_sid(&self, player: &Player, latest_sid: &str) -> Result<Player> {
        let mut player = player.clone();
        player.latest_sid = latest_sid.to_string();
        self.players.update(&player).await
    }

    /// Set or clear the `disconnected_at` stamp. Idempotent for an equal
    /// timestamp.
    pub async fn update_disconnected_time(
        &self,
        player: &Player,
        disconnected_at: Option<DateTime<Utc>>,
    ) -> Result<Player> {
        if player.disconnected_at == disconnected_at {
            return Ok(player.clone());
        }
        let mut player = player.clone();
        player.disconnected_at = disconnected_at;
        self.players.update(&player).await
    }

    /// Remove a player from their room once their grace period has elapsed.
    /// Returns the player and whether they were actually removed.
    pub async fn disconnect_player(
        &self,
        nickname: &str,
        room_id: &str,
        grace_seconds: i64,
    ) -> Result<(Player, bool)> {
        let player = self
            .players
            .get_by_nickname(room_id, nickname)
            .await?
            .ok_or_else(|| Error::PlayerNotFound {
                player_id: nickname.to_string(),
            })?;

        let Some(disconnected_at) = player.disconnected_at else {
            return Ok((player, false));
        };
        if Utc::now() - disconnected_at < Duration::seconds(grace_seconds) {
            return Ok((player, false));
        }

        let mut removed = player.clone();
        removed.room_id = None;
        let removed = self.players.update(&removed).await?;
        tracing::info!(
            player_id = %removed.player_id,
            room_id,
            "player removed from room after grace period"
        );
        Ok((removed, true))
    }

    pub async fn get_disconnected(&self) -> Result<Vec<Player>> {
        self.players.get_disconnected().await
    }
}
