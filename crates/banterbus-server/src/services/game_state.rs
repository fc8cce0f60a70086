use std::sync::Arc;

use banterbus_core::game_state::{
    FibbingAction, FibbingItState, GameSpecificState, GameState, PausedState, PlayerScore,
};
use banterbus_core::player::Player;
use banterbus_fibbing_it::{FibbingIt, GAME_NAME, NextQuestion, RoundTransition};
use banterbus_management::QuestionCatalog;
use chrono::{Duration, Utc};

use crate::error::{Error, Result};
use crate::store::GameStateRepository;

/// Absolute ceiling on how long a game stays paused, in seconds.
pub const PAUSE_TIMER_IN_SECONDS: i64 = 300;

/// Wraps the game engine with deadline and action bookkeeping. All writes
/// happen at the tail of each operation so a failed write never leaves the
/// stored state half-transitioned.
#[derive(Clone)]
pub struct GameStateService {
    game_states: Arc<dyn GameStateRepository>,
    catalog: Arc<dyn QuestionCatalog>,
    engine: FibbingIt,
}

impl GameStateService {
    pub fn new(
        game_states: Arc<dyn GameStateRepository>,
        catalog: Arc<dyn QuestionCatalog>,
        questions_per_round: usize,
    ) -> Self {
        Self {
            game_states,
            catalog,
            engine: FibbingIt::new(questions_per_round),
        }
    }

    pub fn engine(&self) -> &FibbingIt {
        &self.engine
    }

    /// Build and persist the starting state for a room. Only `fibbing_it`
    /// is known.
    pub async fn create(
        &self,
        room_id: &str,
        players: &[Player],
        game_name: &str,
    ) -> Result<GameState> {
        if game_name != GAME_NAME {
            return Err(Error::GameNotFound {
                game_name: game_name.to_string(),
            });
        }

        let state = self.engine.starting_state(&*self.catalog, players).await?;
        let game_state = GameState {
            room_id: room_id.to_string(),
            game_name: game_name.to_string(),
            player_scores: players
                .iter()
                .map(|p| PlayerScore {
                    player_id: p.player_id.clone(),
                    score: 0,
                })
                .collect(),
            state: GameSpecificState::FibbingIt(state),
            action: FibbingAction::ShowQuestion,
            action_completed_by: None,
            answers_expected_by_time: None,
            paused: PausedState::default(),
        };
        self.game_states.add(&game_state).await?;
        tracing::info!(room_id, game_name, "game state created");
        Ok(game_state)
    }

    pub async fn get(&self, room_id: &str) -> Result<GameState> {
        self.game_states.get(room_id).await
    }

    /// Advance the question cursor and open the submission window. Returns
    /// the persisted state and the question bundle for fan-out.
    pub async fn get_next_question(
        &self,
        game_state: &GameState,
    ) -> Result<(GameState, NextQuestion)> {
        let now = Utc::now();
        if game_state.paused.is_paused
            && let Some(stopped_at) = game_state.paused.paused_stopped_at
            && stopped_at < now
        {
            return Err(Error::GameIsPaused {
                room_id: game_state.room_id.clone(),
            });
        }
        if game_state.action != FibbingAction::ShowQuestion {
            return Err(Error::InvalidGameAction {
                expected: FibbingAction::ShowQuestion,
            });
        }

        let old_round = game_state.fibbing_it().current_round;
        let new_state = self
            .engine
            .update_question_state(game_state.fibbing_it())
            .ok_or(Error::GameStateIsNone)?;

        let round_changed =
            self.engine
                .has_round_changed(&new_state, old_round, new_state.current_round);
        let question = self
            .engine
            .next_question(&new_state)
            .ok_or(Error::GameStateIsNone)?;
        let timer = self
            .engine
            .timer(new_state.current_round, game_state.action);

        let completed_by = now + Duration::seconds(timer);
        let mut updated = game_state.clone();
        updated.state = GameSpecificState::FibbingIt(new_state.clone());
        updated.action = game_state.action.next();
        updated.action_completed_by = Some(completed_by);
        updated.answers_expected_by_time = Some(completed_by);
        let updated = self.game_states.update(&updated).await?;

        Ok((
            updated,
            NextQuestion {
                question,
                updated_round: RoundTransition {
                    round_changed,
                    new_round: new_state.current_round,
                },
                timer_in_seconds: timer,
            },
        ))
    }

    /// Persist a new game-specific state.
    pub async fn update_state(
        &self,
        game_state: &GameState,
        state: FibbingItState,
    ) -> Result<GameState> {
        let mut updated = game_state.clone();
        updated.state = GameSpecificState::FibbingIt(state);
        self.game_states.update(&updated).await
    }

    /// Move to the next action with a fresh deadline.
    pub async fn update_next_action(
        &self,
        game_state: &GameState,
        next_action: FibbingAction,
        timer_in_seconds: i64,
    ) -> Result<GameState> {
        let mut updated = game_state.clone();
        updated.action = next_action;
        updated.action_completed_by = Some(Utc::now() + Duration::seconds(timer_in_seconds));
        self.game_states.update(&updated).await
    }

    /// Pause the game. A disconnect-driven pause stacks: each disconnected
    /// player joins the waiting set, and the ceiling is pushed out again.
    pub async fn pause_game(
        &self,
        room_id: &str,
        player_disconnected: Option<&str>,
    ) -> Result<i64> {
        let game_state = self.game_states.get(room_id).await?;
        if game_state.paused.is_paused && player_disconnected.is_none() {
            return Err(Error::GameStateAlreadyPaused {
                room_id: room_id.to_string(),
            });
        }

        let mut updated = game_state;
        updated.paused.is_paused = true;
        updated.paused.paused_stopped_at =
            Some(Utc::now() + Duration::seconds(PAUSE_TIMER_IN_SECONDS));
        if let Some(player_id) = player_disconnected
            && !updated
                .paused
                .waiting_for_players
                .iter()
                .any(|p| p == player_id)
        {
            updated
                .paused
                .waiting_for_players
                .push(player_id.to_string());
        }
        self.game_states.update(&updated).await?;
        Ok(PAUSE_TIMER_IN_SECONDS)
    }

    /// Unpause, or shrink the waiting set. Callers emit `GAME_UNPAUSED`
    /// only when the returned record shows the game actually resumed.
    pub async fn unpause_game(
        &self,
        room_id: &str,
        player_reconnected: Option<&str>,
    ) -> Result<PausedState> {
        let game_state = self.game_states.get(room_id).await?;
        if !game_state.paused.is_paused {
            return Err(Error::GameStateNotPaused {
                room_id: room_id.to_string(),
            });
        }

        let mut updated = game_state;
        if let Some(player_id) = player_reconnected {
            updated
                .paused
                .waiting_for_players
                .retain(|p| p != player_id);
        }
        if updated.paused.waiting_for_players.is_empty() {
            updated.paused = PausedState::default();
        }
        let updated = self.game_states.update(&updated).await?;
        Ok(updated.paused)
    }
}
