use std::collections::HashMap;

use banterbus_core::events::inbound::{
    GetAnswersFibbingIt, GetNextQuestion, SubmitAnswerFibbingIt,
};
use banterbus_core::events::outbound::{
    AnswerSubmittedFibbingIt, FibbingItAnswer, GotAnswersFibbingIt,
};
use banterbus_core::player::Player;

use crate::dispatcher::Emit;
use crate::error::{Error, Result};
use crate::state::AppState;

/// Seconds granted for the vote once the answers are revealed.
const VOTE_TIMER_IN_SECONDS: i64 = 300;

pub async fn get_next_question(
    state: AppState,
    _sid: String,
    event: GetNextQuestion,
) -> Result<Vec<Emit>> {
    require_member(&state, &event.player_id, &event.room_code).await?;

    let game_state = state.game_state.get(&event.room_code).await?;
    let (updated, next) = state.game_state.get_next_question(&game_state).await?;

    // Fan the question out per player: the fibber sees their decoy.
    let players = state.players.get_all_in_room(&event.room_code).await?;
    let engine = state.game_state.engine();
    Ok(players
        .iter()
        .map(|player| {
            Emit::to_sid(
                &player.latest_sid,
                &engine.got_next_question(player, &updated, &next),
            )
        })
        .collect())
}

pub async fn submit_answer_fibbing_it(
    state: AppState,
    sid: String,
    event: SubmitAnswerFibbingIt,
) -> Result<Vec<Emit>> {
    require_member(&state, &event.player_id, &event.room_code).await?;

    let players = state.players.get_all_in_room(&event.room_code).await?;
    let game_state = state.game_state.get(&event.room_code).await?;
    let player_ids: Vec<String> = players.iter().map(|p| p.player_id.clone()).collect();

    let new_state = state.game_state.engine().submit_answers(
        &game_state,
        &player_ids,
        &event.player_id,
        &event.answer,
    )?;

    let all_players_submitted = new_state.questions.current_answers.len() == players.len();
    state.game_state.update_state(&game_state, new_state).await?;

    Ok(vec![Emit::to_sid(
        &sid,
        &AnswerSubmittedFibbingIt {
            all_players_submitted,
        },
    )])
}

pub async fn get_answers_fibbing_it(
    state: AppState,
    sid: String,
    event: GetAnswersFibbingIt,
) -> Result<Vec<Emit>> {
    require_member(&state, &event.player_id, &event.room_code).await?;

    let players = state.players.get_all_in_room(&event.room_code).await?;
    let game_state = state.game_state.get(&event.room_code).await?;
    let player_ids: Vec<String> = players.iter().map(|p| p.player_id.clone()).collect();

    let engine = state.game_state.engine();
    let filled = engine.select_random_answer(&game_state, &player_ids)?;

    let next_action = game_state.action.next();
    let updated = state.game_state.update_state(&game_state, filled.clone()).await?;
    state
        .game_state
        .update_next_action(&updated, next_action, VOTE_TIMER_IN_SECONDS)
        .await?;

    let nicknames: HashMap<String, String> = players
        .iter()
        .map(|p| (p.player_id.clone(), p.nickname.clone()))
        .collect();
    let answers = engine
        .player_answers(&filled, &nicknames)?
        .into_iter()
        .map(|(nickname, answer)| FibbingItAnswer { nickname, answer })
        .collect();

    Ok(vec![Emit::to_sid(
        &sid,
        &GotAnswersFibbingIt {
            answers,
            timer_in_seconds: VOTE_TIMER_IN_SECONDS,
        },
    )])
}

async fn require_member(state: &AppState, player_id: &str, room_code: &str) -> Result<Player> {
    let player = state.players.get(player_id).await?;
    if player.room_id.as_deref() != Some(room_code) {
        return Err(Error::PlayerNotInRoom {
            player_id: player_id.to_string(),
            room_id: room_code.to_string(),
        });
    }
    Ok(player)
}

#[cfg(test)]
mod tests {
    use banterbus_core::events::Frame;
    use banterbus_core::player::NewPlayer;
    use chrono::{Duration, Utc};
    use serde_json::json;

    use super::*;
    use crate::dispatcher;
    use crate::handlers::testing::app_state;
    use crate::state::AppState;
    use crate::store::MemoryStore;

    /// Room of two with a started game, the submission window open.
    async fn game_in_submit_window(
        state: &AppState,
    ) -> (String, String, String) {
        let room = state.rooms.create().await.unwrap();
        let host = state
            .lobby
            .join(
                &room.room_id,
                NewPlayer {
                    nickname: "Majiy".to_string(),
                    avatar: vec![1],
                    latest_sid: "sid-host".to_string(),
                },
            )
            .await
            .unwrap();
        let other = state
            .lobby
            .join(
                &room.room_id,
                NewPlayer {
                    nickname: "CanIHaseeburger".to_string(),
                    avatar: vec![2],
                    latest_sid: "sid-other".to_string(),
                },
            )
            .await
            .unwrap();

        state
            .lobby
            .start_game(&*state.games, "fibbing_it", &host.player_id, &room.room_id)
            .await
            .unwrap();
        let players = state.players.get_all_in_room(&room.room_id).await.unwrap();
        state
            .game_state
            .create(&room.room_id, &players, "fibbing_it")
            .await
            .unwrap();

        let game_state = state.game_state.get(&room.room_id).await.unwrap();
        state.game_state.get_next_question(&game_state).await.unwrap();

        (room.room_id, host.player_id, other.player_id)
    }

    async fn expire_submission_window(state: &AppState, store: &MemoryStore, room_id: &str) {
        let mut game_state = state.game_state.get(room_id).await.unwrap();
        game_state.action_completed_by = Some(Utc::now() - Duration::seconds(1));
        crate::store::GameStateRepository::update(store, &game_state)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn submit_reports_progress_to_the_submitter_only() {
        let (state, _, _) = app_state();
        let (room_id, host_id, other_id) = game_in_submit_window(&state).await;

        let event = banterbus_core::events::inbound::SubmitAnswerFibbingIt {
            player_id: host_id,
            answer: "lame".to_string(),
            room_code: room_id.clone(),
        };
        let emits = submit_answer_fibbing_it(state.clone(), "sid-host".to_string(), event)
            .await
            .unwrap();

        assert_eq!(emits.len(), 1);
        assert_eq!(emits[0].event, "ANSWER_SUBMITTED_FIBBING_IT");
        assert_eq!(emits[0].payload["all_players_submitted"], false);

        let event = banterbus_core::events::inbound::SubmitAnswerFibbingIt {
            player_id: other_id,
            answer: "tasty".to_string(),
            room_code: room_id,
        };
        let emits = submit_answer_fibbing_it(state, "sid-other".to_string(), event)
            .await
            .unwrap();
        assert_eq!(emits[0].payload["all_players_submitted"], true);
    }

    #[tokio::test]
    async fn late_submission_maps_to_time_run_out() {
        let (state, store, transport) = app_state();
        let (room_id, host_id, _) = game_in_submit_window(&state).await;
        expire_submission_window(&state, &store, &room_id).await;

        let frame = Frame {
            event: "SUBMIT_ANSWER_FIBBING_IT".to_string(),
            data: json!({
                "player_id": host_id,
                "answer": "lame",
                "room_code": room_id,
            }),
        };
        dispatcher::dispatch(&state, "sid-host", frame).await;

        let emits = transport.take_emits().await;
        assert_eq!(emits.len(), 1);
        assert_eq!(emits[0].event, "ERROR");
        assert_eq!(emits[0].payload["code"], "time_run_out");
        assert_eq!(
            emits[0].payload["message"],
            "Cannot submit answer, time has run out"
        );
    }

    #[tokio::test]
    async fn timed_out_window_is_filled_and_answers_revealed() {
        let (state, store, _) = app_state();
        let (room_id, host_id, _) = game_in_submit_window(&state).await;
        expire_submission_window(&state, &store, &room_id).await;

        let event = GetAnswersFibbingIt {
            player_id: host_id,
            room_code: room_id.clone(),
        };
        let emits = get_answers_fibbing_it(state.clone(), "sid-host".to_string(), event)
            .await
            .unwrap();

        assert_eq!(emits.len(), 1);
        assert_eq!(emits[0].event, "GOT_ANSWERS_FIBBING_IT");
        assert_eq!(emits[0].payload["timer_in_seconds"], 300);
        let answers = emits[0].payload["answers"].as_array().unwrap();
        assert_eq!(answers.len(), 2, "an answer per player after the fill");

        // The action cycle advanced with a fresh deadline.
        let game_state = state.game_state.get(&room_id).await.unwrap();
        assert_eq!(
            game_state.action,
            banterbus_core::game_state::FibbingAction::VoteOnFibber
        );
        assert!(game_state.action_completed_by.unwrap() > Utc::now());
    }
}
