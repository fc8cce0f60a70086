use banterbus_core::events::inbound::{JoinRoom, KickPlayer, RejoinRoom, StartGame};
use banterbus_core::events::outbound::{
    GameStarted, GameUnpaused, NewRoomJoined, PlayerInfo, PlayerKicked, RoomJoined,
};
use banterbus_core::player::{NewPlayer, RoomPlayers};
use banterbus_fibbing_it::{NextQuestion, RoundTransition};
use chrono::Utc;

use crate::dispatcher::Emit;
use crate::error::{Error, Result};
use crate::state::AppState;

pub async fn join_room(state: AppState, sid: String, event: JoinRoom) -> Result<Vec<Emit>> {
    let new_player = NewPlayer {
        nickname: event.nickname,
        avatar: event.avatar,
        latest_sid: sid.clone(),
    };

    match state.lobby.join(&event.room_code, new_player).await {
        Ok(room_players) => {
            state.transport.join(&sid, &event.room_code).await;
            Ok(vec![
                Emit::to_sid(
                    &sid,
                    &NewRoomJoined {
                        player_id: room_players.player_id.clone(),
                    },
                ),
                Emit::to_room(&event.room_code, &room_joined_event(&room_players)),
            ])
        }
        Err(Error::RoomNotFound { .. }) => Ok(vec![Emit::error(
            &sid,
            "room_join_fail",
            "room not found",
        )]),
        Err(Error::NicknameExists { nickname }) => Ok(vec![Emit::error(
            &sid,
            "room_join_fail",
            format!("nickname {nickname} already exists"),
        )]),
        Err(e) => Err(e),
    }
}

pub async fn rejoin_room(state: AppState, sid: String, event: RejoinRoom) -> Result<Vec<Emit>> {
    let player = state.players.get(&event.player_id).await?;
    let Some(room_id) = player.room_id.clone() else {
        return Ok(vec![Emit::error(
            &sid,
            "room_join_fail",
            "disconnected from room, please re-join with a new nickname",
        )]);
    };

    // The payload does not carry the room, so the lock is taken here once
    // the player record has named it.
    let _guard = state.locks.acquire(&room_id).await;

    let room_players = match state.lobby.rejoin(&event.player_id, &sid).await {
        Ok(room_players) => room_players,
        Err(Error::RoomNotFound { .. }) => {
            return Ok(vec![Emit::error(&sid, "room_join_fail", "room not found")]);
        }
        Err(Error::PlayerHasNoRoom { .. }) => {
            return Ok(vec![Emit::error(
                &sid,
                "room_join_fail",
                "disconnected from room, please re-join with a new nickname",
            )]);
        }
        Err(e) => return Err(e),
    };

    state.transport.join(&sid, &room_id).await;
    let mut emits = vec![Emit::to_sid(&sid, &room_joined_event(&room_players))];

    let room = state.rooms.get(&room_id).await?;
    if room.state.is_rejoinable_and_started()
        && let Some(emit) = replay_current_question(&state, &sid, &event.player_id, &room_id).await?
    {
        emits.push(emit);
    }

    match state
        .game_state
        .unpause_game(&room_id, Some(&event.player_id))
        .await
    {
        Ok(paused) if !paused.is_paused => {
            emits.push(Emit::to_room(&room_id, &GameUnpaused {}));
        }
        // Still waiting on other players, or nothing to unpause.
        Ok(_) => {}
        Err(Error::GameStateNotFound { .. } | Error::GameStateNotPaused { .. }) => {}
        Err(e) => return Err(e),
    }

    Ok(emits)
}

pub async fn kick_player(state: AppState, sid: String, event: KickPlayer) -> Result<Vec<Emit>> {
    match state
        .lobby
        .kick_player(&event.kick_player_nickname, &event.player_id, &event.room_code)
        .await
    {
        Ok(kicked) => {
            state.transport.leave(&kicked.latest_sid, &event.room_code).await;
            Ok(vec![Emit::to_room(
                &event.room_code,
                &PlayerKicked {
                    nickname: kicked.nickname,
                },
            )])
        }
        Err(Error::RoomInInvalidState { .. }) => Ok(vec![Emit::error(
            &sid,
            "kick_player_fail",
            "The game has started playing, so cannot kick player",
        )]),
        Err(Error::PlayerNotHost { .. }) => Ok(vec![Emit::error(
            &sid,
            "kick_player_fail",
            "You are not host, so cannot kick another player",
        )]),
        Err(Error::RoomNotFound { .. }) => Ok(vec![Emit::error(
            &sid,
            "kick_player_fail",
            "Room not found",
        )]),
        Err(e) => Err(e),
    }
}

pub async fn start_game(state: AppState, _sid: String, event: StartGame) -> Result<Vec<Emit>> {
    let room = state
        .lobby
        .start_game(
            &*state.games,
            &event.game_name,
            &event.player_id,
            &event.room_code,
        )
        .await?;

    let players = state.players.get_all_in_room(&room.room_id).await?;
    state
        .game_state
        .create(&room.room_id, &players, &event.game_name)
        .await?;

    Ok(vec![Emit::to_room(
        &event.room_code,
        &GameStarted {
            game_name: event.game_name,
        },
    )])
}

fn room_joined_event(room_players: &RoomPlayers) -> RoomJoined {
    RoomJoined {
        host_player_nickname: room_players.host_player_nickname.clone(),
        players: room_players.players.iter().map(PlayerInfo::from).collect(),
    }
}

/// Re-send the question currently in play to a rejoining player. Nothing is
/// advanced; the remaining window is reported so the client can restart its
/// countdown.
async fn replay_current_question(
    state: &AppState,
    sid: &str,
    player_id: &str,
    room_id: &str,
) -> Result<Option<Emit>> {
    let game_state = match state.game_state.get(room_id).await {
        Ok(game_state) => game_state,
        Err(Error::GameStateNotFound { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };

    let engine = state.game_state.engine();
    let fibbing = game_state.fibbing_it();
    let Some(question) = engine.next_question(fibbing) else {
        return Ok(None);
    };

    let timer_in_seconds = game_state
        .action_completed_by
        .map(|completed_by| (completed_by - Utc::now()).num_seconds().max(0))
        .unwrap_or_else(|| engine.timer(fibbing.current_round, game_state.action));

    let next = NextQuestion {
        question,
        updated_round: RoundTransition {
            round_changed: false,
            new_round: fibbing.current_round,
        },
        timer_in_seconds,
    };

    let player = state.players.get(player_id).await?;
    let view = engine.got_next_question(&player, &game_state, &next);
    Ok(Some(Emit::to_sid(sid, &view)))
}
