use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of the FibbingIt question cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FibbingAction {
    ShowQuestion,
    SubmitAnswers,
    VoteOnFibber,
}

impl FibbingAction {
    /// The action cycle is a strict 3-cycle with no other edges.
    pub fn next(&self) -> Self {
        match self {
            Self::ShowQuestion => Self::SubmitAnswers,
            Self::SubmitAnswers => Self::VoteOnFibber,
            Self::VoteOnFibber => Self::ShowQuestion,
        }
    }
}

impl std::fmt::Display for FibbingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ShowQuestion => "SHOW_QUESTION",
            Self::SubmitAnswers => "SUBMIT_ANSWERS",
            Self::VoteOnFibber => "VOTE_ON_FIBBER",
        };
        f.write_str(s)
    }
}

/// FibbingIt round. The order is fixed: opinion, likely, free_form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FibbingRound {
    Opinion,
    Likely,
    FreeForm,
}

impl FibbingRound {
    pub const ALL: [FibbingRound; 3] = [Self::Opinion, Self::Likely, Self::FreeForm];

    /// Rounds whose questions are drawn from question groups.
    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Opinion | Self::FreeForm)
    }

    /// The round after this one, `None` after the last.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Opinion => Some(Self::Likely),
            Self::Likely => Some(Self::FreeForm),
            Self::FreeForm => None,
        }
    }

    /// Wire-format name, as the management service and clients know it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opinion => "opinion",
            Self::Likely => "likely",
            Self::FreeForm => "free_form",
        }
    }
}

impl std::fmt::Display for FibbingRound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One question slot. For the opinion and likely rounds `answers` is a closed
/// set; the free_form round takes free text and carries no answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibbingItQuestion {
    pub fibber_question: String,
    pub question: String,
    pub answers: Option<Vec<String>>,
}

/// The questions drawn for each round at game start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibbingItRounds {
    pub opinion: Vec<FibbingItQuestion>,
    pub likely: Vec<FibbingItQuestion>,
    pub free_form: Vec<FibbingItQuestion>,
}

impl FibbingItRounds {
    pub fn for_round(&self, round: FibbingRound) -> &[FibbingItQuestion] {
        match round {
            FibbingRound::Opinion => &self.opinion,
            FibbingRound::Likely => &self.likely,
            FibbingRound::FreeForm => &self.free_form,
        }
    }
}

/// Question cursor and the answers collected for the current question.
/// `question_nb` is -1 before the first question of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibbingItQuestionsState {
    pub rounds: FibbingItRounds,
    pub question_nb: i32,
    pub current_answers: HashMap<String, String>,
}

/// Full FibbingIt game-specific state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibbingItState {
    pub current_fibber_id: String,
    pub current_round: FibbingRound,
    pub questions: FibbingItQuestionsState,
}

impl FibbingItState {
    /// The question the cursor currently points at, if the cursor has
    /// advanced past the initial position.
    pub fn current_question(&self) -> Option<&FibbingItQuestion> {
        let nb = usize::try_from(self.questions.question_nb).ok()?;
        self.questions.rounds.for_round(self.current_round).get(nb)
    }
}

/// Game-specific state, tagged by game name. Only FibbingIt is implemented;
/// other games dispatch on this tag when they land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameSpecificState {
    FibbingIt(FibbingItState),
}

/// Per-player score entry. Scoring is not mutated yet; entries stay at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_id: String,
    pub score: i64,
}

/// Pause bookkeeping. `waiting_for_players` holds players the room is
/// waiting on before the game resumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PausedState {
    pub is_paused: bool,
    pub paused_stopped_at: Option<DateTime<Utc>>,
    pub waiting_for_players: Vec<String>,
}

/// A game-state document, owned 1:1 by a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub room_id: String,
    pub game_name: String,
    pub player_scores: Vec<PlayerScore>,
    pub state: GameSpecificState,
    pub action: FibbingAction,
    pub action_completed_by: Option<DateTime<Utc>>,
    pub answers_expected_by_time: Option<DateTime<Utc>>,
    pub paused: PausedState,
}

impl GameState {
    /// Borrow the FibbingIt state.
    pub fn fibbing_it(&self) -> &FibbingItState {
        match &self.state {
            GameSpecificState::FibbingIt(state) => state,
        }
    }
}
