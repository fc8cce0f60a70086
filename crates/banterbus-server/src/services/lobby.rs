use banterbus_core::player::{NewPlayer, Player, RoomPlayers};
use banterbus_core::room::{Room, RoomState};
use banterbus_management::GameCatalog;

use crate::error::{Error, Result};
use crate::services::{PlayerService, RoomService};

/// Composes the player and room services into the lobby operations:
/// join, rejoin, kick and game start.
#[derive(Clone)]
pub struct LobbyService {
    rooms: RoomService,
    players: PlayerService,
}

impl LobbyService {
    pub fn new(rooms: RoomService, players: PlayerService) -> Self {
        Self { rooms, players }
    }

    pub async fn join(&self, room_id: &str, new_player: NewPlayer) -> Result<RoomPlayers> {
        let room = self.rooms.get(room_id).await?;
        if !room.state.is_joinable() {
            return Err(Error::RoomNotJoinable {
                room_id: room.room_id.clone(),
                state: room.state,
            });
        }

        let existing = self.players.get_all_in_room(&room.room_id).await?;
        if existing.iter().any(|p| p.nickname == new_player.nickname) {
            return Err(Error::NicknameExists {
                nickname: new_player.nickname,
            });
        }

        let player = self.players.create(&room.room_id, new_player).await?;
        let room = match &room.host {
            Some(_) => room,
            None => self.rooms.update_host(&room, &player.player_id).await?,
        };

        // First join elected a host above, so this only trips on a
        // corrupted room document.
        let host = room.host.clone().ok_or_else(|| Error::RoomHasNoHost {
            room_id: room.room_id.clone(),
        })?;

        self.rooms.update_player_count(&room, true).await?;

        let mut players = existing;
        players.push(player.clone());
        membership_view(&host, players, &player.player_id, &room.room_id)
    }

    pub async fn rejoin(&self, player_id: &str, latest_sid: &str) -> Result<RoomPlayers> {
        let player = self.players.get(player_id).await?;
        let player = self.players.update_latest_sid(&player, latest_sid).await?;

        let room_id = player.room_id.clone().ok_or_else(|| Error::PlayerHasNoRoom {
            player_id: player.player_id.clone(),
        })?;

        self.players.update_disconnected_time(&player, None).await?;

        let room = self.rooms.get(&room_id).await?;
        if !room.state.is_rejoinable() {
            return Err(Error::RoomNotJoinable {
                room_id: room.room_id.clone(),
                state: room.state,
            });
        }
        let host = room.host.clone().ok_or_else(|| Error::RoomHasNoHost {
            room_id: room.room_id.clone(),
        })?;

        let players = self.players.get_all_in_room(&room_id).await?;
        membership_view(&host, players, player_id, &room_id)
    }

    /// Kick a player out of a lobby. Only the host may kick, and only
    /// before the game starts. The returned player still carries their
    /// last sid so the caller can detach them from the room channel.
    pub async fn kick_player(
        &self,
        player_to_kick_nickname: &str,
        player_attempting_kick: &str,
        room_id: &str,
    ) -> Result<Player> {
        let room = self.rooms.get(room_id).await?;
        check_is_host(&room, player_attempting_kick)?;
        if room.state != RoomState::Created {
            return Err(Error::RoomInInvalidState {
                expected: RoomState::Created,
                actual: room.state,
            });
        }

        let player = self
            .players
            .remove_from_room(player_to_kick_nickname, &room.room_id)
            .await?;
        self.rooms.update_player_count(&room, false).await?;
        tracing::info!(
            room_id,
            kicked = %player.player_id,
            by = player_attempting_kick,
            "player kicked from room"
        );
        Ok(player)
    }

    /// Elect any remaining member as the new host. Order is whatever the
    /// membership listing yields; callers must not rely on a particular
    /// successor.
    pub async fn update_host(&self, room: &Room, old_host_id: &str) -> Result<Player> {
        let players = self.players.get_all_in_room(&room.room_id).await?;
        for player in players {
            if player.player_id != old_host_id {
                self.rooms.update_host(room, &player.player_id).await?;
                return Ok(player);
            }
        }
        Err(Error::NoOtherHost {
            room_id: room.room_id.clone(),
        })
    }

    /// Validate and start the game: room still in lobby, actor is host,
    /// the game is enabled, and the player count is inside its bounds.
    pub async fn start_game(
        &self,
        games: &dyn GameCatalog,
        game_name: &str,
        player_id: &str,
        room_id: &str,
    ) -> Result<Room> {
        let room = self.rooms.get(room_id).await?;
        if room.state != RoomState::Created {
            return Err(Error::RoomInInvalidState {
                expected: RoomState::Created,
                actual: room.state,
            });
        }
        check_is_host(&room, player_id)?;

        let game = games.get_game(game_name).await.map_err(|e| {
            if e.is_not_found() {
                Error::GameNotFound {
                    game_name: game_name.to_string(),
                }
            } else {
                Error::Management(e)
            }
        })?;

        if !game.enabled {
            return Err(Error::GameNotEnabled {
                game_name: game_name.to_string(),
            });
        }
        if room.player_count > game.maximum_players {
            return Err(Error::TooManyPlayersInRoom {
                room_id: room.room_id.clone(),
                game_name: game_name.to_string(),
                player_count: room.player_count,
                maximum_players: game.maximum_players,
            });
        }
        if room.player_count < game.minimum_players {
            return Err(Error::TooFewPlayersInRoom {
                room_id: room.room_id.clone(),
                game_name: game_name.to_string(),
                player_count: room.player_count,
                minimum_players: game.minimum_players,
            });
        }

        let mut room = room;
        room.game_name = Some(game_name.to_string());
        let room = self.rooms.update_game_state(&room, RoomState::Playing).await?;
        tracing::info!(room_id, game_name, "game started");
        Ok(room)
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

fn membership_view(
    host_player_id: &str,
    players: Vec<Player>,
    player_id: &str,
    room_code: &str,
) -> Result<RoomPlayers> {
    let host_player_nickname = players
        .iter()
        .find(|p| p.player_id == host_player_id)
        .map(|p| p.nickname.clone())
        .ok_or_else(|| Error::RoomHasNoHost {
            room_id: room_code.to_string(),
        })?;
    Ok(RoomPlayers {
        players,
        host_player_nickname,
        player_id: player_id.to_string(),
        room_code: room_code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use banterbus_management::testing::StaticCatalog;
    use chrono::Utc;

    use super::*;
    use crate::store::MemoryStore;

    fn services() -> (LobbyService, RoomService, PlayerService) {
        let store = Arc::new(MemoryStore::new());
        let rooms = RoomService::new(Arc::clone(&store) as _);
        let players = PlayerService::new(store as _);
        (
            LobbyService::new(rooms.clone(), players.clone()),
            rooms,
            players,
        )
    }

    fn new_player(nickname: &str) -> NewPlayer {
        NewPlayer {
            nickname: nickname.to_string(),
            avatar: vec![7],
            latest_sid: format!("sid-{nickname}"),
        }
    }

    #[tokio::test]
    async fn first_join_becomes_host() {
        let (lobby, rooms, _) = services();
        let room = rooms.create().await.unwrap();

        let joined = lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();

        assert_eq!(joined.host_player_nickname, "Majiy");
        assert_eq!(joined.players.len(), 1);
        assert_eq!(joined.room_code, room.room_id);

        let stored = rooms.get(&room.room_id).await.unwrap();
        assert_eq!(stored.player_count, 1);
        assert!(stored.host.is_some());
    }

    #[tokio::test]
    async fn second_join_keeps_the_first_host() {
        let (lobby, rooms, _) = services();
        let room = rooms.create().await.unwrap();
        lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();

        let joined = lobby
            .join(&room.room_id, new_player("CanIHaseeburger"))
            .await
            .unwrap();

        assert_eq!(joined.host_player_nickname, "Majiy");
        assert_eq!(joined.players.len(), 2);
        assert_eq!(rooms.get(&room.room_id).await.unwrap().player_count, 2);
    }

    #[tokio::test]
    async fn join_rejects_duplicate_nicknames() {
        let (lobby, rooms, _) = services();
        let room = rooms.create().await.unwrap();
        lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();

        let err = lobby
            .join(&room.room_id, new_player("Majiy"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NicknameExists { .. }));
        assert_eq!(rooms.get(&room.room_id).await.unwrap().player_count, 1);
    }

    #[tokio::test]
    async fn join_rejects_missing_rooms() {
        let (lobby, _, _) = services();
        let err = lobby.join("nope", new_player("Majiy")).await.unwrap_err();
        assert!(matches!(err, Error::RoomNotFound { .. }));
    }

    #[tokio::test]
    async fn join_rejects_started_rooms() {
        let (lobby, rooms, _) = services();
        let room = rooms.create().await.unwrap();
        rooms
            .update_game_state(&room, RoomState::Playing)
            .await
            .unwrap();

        let err = lobby
            .join(&room.room_id, new_player("Majiy"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RoomNotJoinable { .. }));
    }

    #[tokio::test]
    async fn rejoin_updates_sid_and_clears_disconnect_stamp() {
        let (lobby, rooms, players) = services();
        let room = rooms.create().await.unwrap();
        let joined = lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();

        let player = players.get(&joined.player_id).await.unwrap();
        players
            .update_disconnected_time(&player, Some(Utc::now()))
            .await
            .unwrap();

        let rejoined = lobby.rejoin(&joined.player_id, "sid-new").await.unwrap();

        assert_eq!(rejoined.host_player_nickname, "Majiy");
        let stored = players.get(&joined.player_id).await.unwrap();
        assert_eq!(stored.latest_sid, "sid-new");
        assert!(stored.disconnected_at.is_none());
    }

    #[tokio::test]
    async fn rejoin_rejects_players_without_a_room() {
        let (lobby, rooms, players) = services();
        let room = rooms.create().await.unwrap();
        let joined = lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();
        players.remove_from_room("Majiy", &room.room_id).await.unwrap();

        let err = lobby.rejoin(&joined.player_id, "sid-new").await.unwrap_err();
        assert!(matches!(err, Error::PlayerHasNoRoom { .. }));
    }

    #[tokio::test]
    async fn kick_requires_the_host() {
        let (lobby, rooms, _) = services();
        let room = rooms.create().await.unwrap();
        lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();
        let other = lobby
            .join(&room.room_id, new_player("CanIHaseeburger"))
            .await
            .unwrap();

        let err = lobby
            .kick_player("Majiy", &other.player_id, &room.room_id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PlayerNotHost { .. }));
    }

    #[tokio::test]
    async fn kick_removes_the_player_and_decrements_the_count() {
        let (lobby, rooms, players) = services();
        let room = rooms.create().await.unwrap();
        let host = lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();
        lobby
            .join(&room.room_id, new_player("CanIHaseeburger"))
            .await
            .unwrap();

        let kicked = lobby
            .kick_player("CanIHaseeburger", &host.player_id, &room.room_id)
            .await
            .unwrap();

        assert_eq!(kicked.nickname, "CanIHaseeburger");
        assert!(kicked.room_id.is_none());
        assert!(!kicked.latest_sid.is_empty());
        assert_eq!(rooms.get(&room.room_id).await.unwrap().player_count, 1);
        assert_eq!(players.get_all_in_room(&room.room_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn kick_is_lobby_only() {
        let (lobby, rooms, _) = services();
        let room = rooms.create().await.unwrap();
        let host = lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();
        lobby
            .join(&room.room_id, new_player("CanIHaseeburger"))
            .await
            .unwrap();
        let room = rooms.get(&room.room_id).await.unwrap();
        rooms
            .update_game_state(&room, RoomState::Playing)
            .await
            .unwrap();

        let err = lobby
            .kick_player("CanIHaseeburger", &host.player_id, &room.room_id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RoomInInvalidState { .. }));
    }

    #[tokio::test]
    async fn host_succession_picks_a_different_member() {
        let (lobby, rooms, _) = services();
        let room = rooms.create().await.unwrap();
        let host = lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();
        lobby
            .join(&room.room_id, new_player("CanIHaseeburger"))
            .await
            .unwrap();
        let room = rooms.get(&room.room_id).await.unwrap();

        let new_host = lobby.update_host(&room, &host.player_id).await.unwrap();

        assert_ne!(new_host.player_id, host.player_id);
        assert_eq!(
            rooms.get(&room.room_id).await.unwrap().host,
            Some(new_host.player_id)
        );
    }

    #[tokio::test]
    async fn host_succession_fails_alone() {
        let (lobby, rooms, _) = services();
        let room = rooms.create().await.unwrap();
        let host = lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();
        let room = rooms.get(&room.room_id).await.unwrap();

        let err = lobby.update_host(&room, &host.player_id).await.unwrap_err();
        assert!(matches!(err, Error::NoOtherHost { .. }));
    }

    #[tokio::test]
    async fn start_game_moves_the_room_to_playing() {
        let (lobby, rooms, _) = services();
        let catalog = StaticCatalog::default();
        let room = rooms.create().await.unwrap();
        let host = lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();
        lobby
            .join(&room.room_id, new_player("CanIHaseeburger"))
            .await
            .unwrap();

        let room = lobby
            .start_game(&catalog, "fibbing_it", &host.player_id, &room.room_id)
            .await
            .unwrap();

        assert_eq!(room.state, RoomState::Playing);
        assert_eq!(room.game_name.as_deref(), Some("fibbing_it"));
    }

    #[tokio::test]
    async fn start_game_requires_host_and_enabled_game() {
        let (lobby, rooms, _) = services();
        let room = rooms.create().await.unwrap();
        let host = lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();
        let other = lobby
            .join(&room.room_id, new_player("CanIHaseeburger"))
            .await
            .unwrap();

        let err = lobby
            .start_game(
                &StaticCatalog::default(),
                "fibbing_it",
                &other.player_id,
                &room.room_id,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PlayerNotHost { .. }));

        let err = lobby
            .start_game(
                &StaticCatalog::disabled(),
                "fibbing_it",
                &host.player_id,
                &room.room_id,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GameNotEnabled { .. }));

        let err = lobby
            .start_game(
                &StaticCatalog::missing(),
                "fibbing_it",
                &host.player_id,
                &room.room_id,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GameNotFound { .. }));
    }

    #[tokio::test]
    async fn start_game_enforces_player_bounds() {
        let (lobby, rooms, _) = services();
        let room = rooms.create().await.unwrap();
        let host = lobby.join(&room.room_id, new_player("Majiy")).await.unwrap();

        // One player against a 2-player minimum.
        let err = lobby
            .start_game(
                &StaticCatalog::default(),
                "fibbing_it",
                &host.player_id,
                &room.room_id,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TooFewPlayersInRoom { .. }));

        let tiny = StaticCatalog {
            maximum_players: 1,
            minimum_players: 1,
            ..StaticCatalog::default()
        };
        lobby
            .join(&room.room_id, new_player("CanIHaseeburger"))
            .await
            .unwrap();
        let err = lobby
            .start_game(&tiny, "fibbing_it", &host.player_id, &room.room_id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TooManyPlayersInRoom { .. }));
    }
}
