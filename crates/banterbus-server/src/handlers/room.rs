use banterbus_core::events::inbound::{
    CreateRoom, PauseGame, PermanentlyDisconnectPlayer, UnpauseGame,
};
use banterbus_core::events::outbound::{
    GamePaused, GameUnpaused, HostDisconnected, PermanentlyDisconnectedPlayer, PlayerDisconnected,
    RoomCreated,
};
use banterbus_core::player::Player;
use banterbus_core::room::RoomState;
use chrono::Utc;

use crate::dispatcher::{Emit, emit_all};
use crate::error::{Error, Result};
use crate::state::AppState;

pub async fn create_room(state: AppState, sid: String, _event: CreateRoom) -> Result<Vec<Emit>> {
    match state.rooms.create().await {
        Ok(room) => Ok(vec![Emit::to_sid(
            &sid,
            &RoomCreated {
                room_code: room.room_id,
            },
        )]),
        Err(Error::RoomExists { .. }) => Ok(vec![Emit::error(
            &sid,
            "room_create_fail",
            "failed to create room",
        )]),
        Err(e) => Err(e),
    }
}

pub async fn pause_game(state: AppState, _sid: String, event: PauseGame) -> Result<Vec<Emit>> {
    let paused_for = state
        .rooms
        .pause_game(&event.room_code, &event.player_id, &state.game_state)
        .await?;

    Ok(vec![Emit::to_room(
        &event.room_code,
        &GamePaused {
            paused_for,
            message: "Game has been paused".to_string(),
        },
    )])
}

pub async fn unpause_game(state: AppState, _sid: String, event: UnpauseGame) -> Result<Vec<Emit>> {
    let paused = state
        .rooms
        .unpause_game(&event.room_code, &event.player_id, &state.game_state)
        .await?;

    // Players are still missing; the room stays paused and nobody is told
    // otherwise.
    if paused.is_paused {
        return Ok(vec![]);
    }
    Ok(vec![Emit::to_room(&event.room_code, &GameUnpaused {})])
}

pub async fn permanently_disconnect_player(
    state: AppState,
    _sid: String,
    event: PermanentlyDisconnectPlayer,
) -> Result<Vec<Emit>> {
    let room = state.rooms.get(&event.room_code).await?;

    let (player, removed) = state
        .players
        .disconnect_player(
            &event.nickname,
            &event.room_code,
            state.settings.disconnect_timer_in_seconds,
        )
        .await?;

    // The count only moves when the grace period has actually elapsed and
    // the player left the room.
    if !removed {
        return Err(Error::Internal(format!(
            "player {} is still within their grace period",
            player.player_id
        )));
    }

    state.rooms.update_player_count(&room, false).await?;
    state.transport.leave(&player.latest_sid, &event.room_code).await;

    Ok(vec![Emit::to_room(
        &event.room_code,
        &PermanentlyDisconnectedPlayer {
            nickname: event.nickname,
        },
    )])
}

/// Transport callback for a dropped connection. Not an inbound event: it is
/// invoked by the socket layer after the read loop ends, emits directly,
/// and never answers the (gone) originating sid.
pub async fn player_disconnected(state: &AppState, sid: &str) {
    let player = match state.players.get_by_sid(sid).await {
        Ok(Some(player)) => player,
        Ok(None) => {
            tracing::debug!(%sid, "disconnect from a session with no player");
            return;
        }
        Err(e) => {
            tracing::error!(%sid, error = %e, "failed to resolve disconnecting player");
            return;
        }
    };

    if let Err(e) = handle_disconnect(state, player).await {
        tracing::error!(%sid, error = %e, "disconnect handling failed");
    }
}

async fn handle_disconnect(state: &AppState, player: Player) -> Result<()> {
    let player = state
        .players
        .update_disconnected_time(&player, Some(Utc::now()))
        .await?;

    let Some(room_id) = player.room_id.clone() else {
        return Ok(());
    };

    let _guard = state.locks.acquire(&room_id).await;
    let room = state.rooms.get(&room_id).await?;
    let mut emits = Vec::new();

    if room.host.as_deref() == Some(player.player_id.as_str()) {
        match state.lobby.update_host(&room, &player.player_id).await {
            Ok(new_host) => emits.push(Emit::to_room(
                &room_id,
                &HostDisconnected {
                    new_host_nickname: new_host.nickname,
                },
            )),
            Err(Error::NoOtherHost { .. }) => {
                tracing::info!(room_id, "host disconnected with no successor");
            }
            Err(e) => return Err(e),
        }
    }

    if room.state == RoomState::Playing {
        match state
            .game_state
            .pause_game(&room_id, Some(&player.player_id))
            .await
        {
            Ok(paused_for) => emits.push(Emit::to_room(
                &room_id,
                &GamePaused {
                    paused_for,
                    message: format!(
                        "Player {} disconnected, pausing game.",
                        player.nickname
                    ),
                },
            )),
            Err(Error::GameStateNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    emits.push(Emit::to_room(
        &room_id,
        &PlayerDisconnected {
            nickname: player.nickname.clone(),
            avatar: player.avatar.clone(),
        },
    ));

    emit_all(state, emits).await;
    Ok(())
}
