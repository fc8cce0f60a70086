//! The FibbingIt game engine.
//!
//! Pure functions over [`FibbingItState`]: the only async entry point is
//! [`FibbingIt::starting_state`], which draws questions from the catalog.
//! Everything else is state-in / state-out and never suspends, so the
//! game-state service can hold the room lock across calls without blocking.

mod error;
mod questions;

pub use error::EngineError;

use std::collections::BTreeMap;
use std::collections::HashMap;

use banterbus_core::events::outbound::{
    GotNextQuestion, GotQuestionFibbingIt, UpdateQuestionRoundState,
};
use banterbus_core::game_state::{
    FibbingAction, FibbingItQuestion, FibbingItQuestionsState, FibbingItState, FibbingRound,
    GameState,
};
use banterbus_core::player::Player;
use banterbus_management::QuestionCatalog;
use chrono::Utc;
use rand::seq::IndexedRandom;

/// Catalog name of this game.
pub const GAME_NAME: &str = "fibbing_it";

/// Free-form answers are capped at this many characters.
pub const MAX_FREE_FORM_ANSWER_LEN: usize = 250;

/// The question bundle handed back when the cursor advances: the question,
/// whether a new round opened, and how long the next phase runs.
#[derive(Debug, Clone)]
pub struct NextQuestion {
    pub question: FibbingItQuestion,
    pub updated_round: RoundTransition,
    pub timer_in_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct RoundTransition {
    pub round_changed: bool,
    pub new_round: FibbingRound,
}

#[derive(Debug, Clone)]
pub struct FibbingIt {
    questions_per_round: usize,
}

impl Default for FibbingIt {
    fn default() -> Self {
        Self::new(3)
    }
}

impl FibbingIt {
    pub fn new(questions_per_round: usize) -> Self {
        Self { questions_per_round }
    }

    pub fn questions_per_round(&self) -> usize {
        self.questions_per_round
    }

    /// Builds the state a new game starts from: a uniformly random fibber
    /// and `questions_per_round` questions for each round, cursor parked
    /// before the first question.
    pub async fn starting_state(
        &self,
        catalog: &dyn QuestionCatalog,
        players: &[Player],
    ) -> Result<FibbingItState, EngineError> {
        let fibber = players
            .choose(&mut rand::rng())
            .ok_or(EngineError::NoPlayers)?;
        let rounds = questions::fetch_rounds(catalog, players, self.questions_per_round).await?;
        Ok(FibbingItState {
            current_fibber_id: fibber.player_id.clone(),
            current_round: FibbingRound::Opinion,
            questions: FibbingItQuestionsState {
                rounds,
                question_nb: -1,
                current_answers: HashMap::new(),
            },
        })
    }

    /// Advances the question cursor, rolling into the next round when the
    /// current one is exhausted. Returns `None` once the last free_form
    /// question has been consumed — the game is over.
    pub fn update_question_state(&self, state: &FibbingItState) -> Option<FibbingItState> {
        let mut next = state.clone();
        if state.questions.question_nb == self.last_index() {
            let new_round = state.current_round.next()?;
            next.current_round = new_round;
            next.questions.question_nb = 0;
        } else {
            next.questions.question_nb += 1;
        }
        Some(next)
    }

    /// The question the cursor points at. `None` when the game sits on the
    /// terminal free_form question (or the cursor has not advanced yet).
    pub fn next_question(&self, state: &FibbingItState) -> Option<FibbingItQuestion> {
        if state.current_round == FibbingRound::FreeForm
            && state.questions.question_nb == self.last_index()
        {
            return None;
        }
        state.current_question().cloned()
    }

    /// Seconds granted for an action in a given round.
    pub fn timer(&self, round: FibbingRound, action: FibbingAction) -> i64 {
        match action {
            FibbingAction::ShowQuestion => match round {
                FibbingRound::Opinion => 45,
                FibbingRound::Likely => 30,
                FibbingRound::FreeForm => 60,
            },
            FibbingAction::SubmitAnswers => 30,
            FibbingAction::VoteOnFibber => 60,
        }
    }

    /// A round change is reported either on an actual transition or on the
    /// very first question of the game, so clients always render the
    /// opening round banner.
    pub fn has_round_changed(
        &self,
        state: &FibbingItState,
        old_round: FibbingRound,
        new_round: FibbingRound,
    ) -> bool {
        (state.current_round == FibbingRound::Opinion && state.questions.question_nb == 0)
            || old_round != new_round
    }

    /// Records one player's answer. Validates the submission window and the
    /// answer against the current round's rules. Resubmitting overwrites.
    pub fn submit_answers(
        &self,
        game_state: &GameState,
        player_ids: &[String],
        player_id: &str,
        answer: &str,
    ) -> Result<FibbingItState, EngineError> {
        self.require_submit_window(game_state)?;

        let state = game_state.fibbing_it();
        match state.current_round {
            FibbingRound::FreeForm => {
                if answer.chars().count() > MAX_FREE_FORM_ANSWER_LEN {
                    return Err(EngineError::InvalidAnswer(
                        "invalid answer too long".to_string(),
                    ));
                }
            }
            FibbingRound::Opinion => {
                if let Some(question) = self.next_question(state)
                    && let Some(answers) = &question.answers
                    && !answers.iter().any(|a| a == answer)
                {
                    return Err(EngineError::InvalidAnswer(
                        "invalid answer for round opinion".to_string(),
                    ));
                }
            }
            FibbingRound::Likely => {
                if !player_ids.iter().any(|id| id == answer) {
                    return Err(EngineError::InvalidAnswer(
                        "invalid answer for round likely".to_string(),
                    ));
                }
            }
        }

        let mut next = state.clone();
        next.questions
            .current_answers
            .insert(player_id.to_string(), answer.to_string());
        Ok(next)
    }

    /// Timeout fallback: once the window has closed, fill an answer for
    /// every player who has none. free_form fills an empty string; the
    /// closed rounds pick uniformly from the question's answer set.
    pub fn select_random_answer(
        &self,
        game_state: &GameState,
        player_ids: &[String],
    ) -> Result<FibbingItState, EngineError> {
        let completed_by = self.require_submit_action(game_state)?;
        if Utc::now() < completed_by {
            return Err(EngineError::ActionNotTimedOut);
        }

        let mut state = game_state.fibbing_it().clone();
        for player_id in player_ids {
            let missing = state
                .questions
                .current_answers
                .get(player_id)
                .is_none_or(|answer| answer.is_empty());
            if !missing {
                continue;
            }

            let filled = match state.current_round {
                FibbingRound::FreeForm => String::new(),
                FibbingRound::Opinion | FibbingRound::Likely => {
                    let question = self
                        .next_question(&state)
                        .ok_or(EngineError::NoAnswersFound)?;
                    let answers = question.answers.ok_or(EngineError::NoAnswersFound)?;
                    answers
                        .choose(&mut rand::rng())
                        .ok_or(EngineError::NoAnswersFound)?
                        .clone()
                }
            };
            state
                .questions
                .current_answers
                .insert(player_id.clone(), filled);
        }
        Ok(state)
    }

    /// Maps each recorded answer to the answering player's nickname.
    pub fn player_answers(
        &self,
        state: &FibbingItState,
        player_nicknames: &HashMap<String, String>,
    ) -> Result<BTreeMap<String, String>, EngineError> {
        player_nicknames
            .iter()
            .map(|(player_id, nickname)| {
                let answer = state
                    .questions
                    .current_answers
                    .get(player_id)
                    .ok_or(EngineError::NoAnswersFound)?;
                Ok((nickname.clone(), answer.clone()))
            })
            .collect()
    }

    /// Builds one player's view of the next question: the fibber gets the
    /// decoy question, everyone else the real one.
    pub fn got_next_question(
        &self,
        player: &Player,
        game_state: &GameState,
        next: &NextQuestion,
    ) -> GotNextQuestion {
        let is_fibber = player.player_id == game_state.fibbing_it().current_fibber_id;
        let question = if is_fibber {
            next.question.fibber_question.clone()
        } else {
            next.question.question.clone()
        };
        GotNextQuestion {
            question: GotQuestionFibbingIt {
                is_fibber,
                question,
                answers: next.question.answers.clone(),
            },
            updated_round: UpdateQuestionRoundState {
                round_changed: next.updated_round.round_changed,
                new_round: next.updated_round.new_round.to_string(),
            },
            timer_in_seconds: next.timer_in_seconds,
        }
    }

    fn last_index(&self) -> i32 {
        self.questions_per_round as i32 - 1
    }

    fn require_submit_window(
        &self,
        game_state: &GameState,
    ) -> Result<(), EngineError> {
        let completed_by = self.require_submit_action(game_state)?;
        let now = Utc::now();
        if completed_by <= now {
            return Err(EngineError::ActionTimedOut { now, completed_by });
        }
        Ok(())
    }

    fn require_submit_action(
        &self,
        game_state: &GameState,
    ) -> Result<chrono::DateTime<Utc>, EngineError> {
        if game_state.action != FibbingAction::SubmitAnswers {
            return Err(EngineError::InvalidAction {
                expected: FibbingAction::SubmitAnswers,
                current: game_state.action,
            });
        }
        game_state.action_completed_by.ok_or_else(|| {
            EngineError::InvalidGameState(
                "expected game_state.action_completed_by to exist".to_string(),
            )
        })
    }
}
