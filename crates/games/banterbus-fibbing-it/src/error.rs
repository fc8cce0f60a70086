use banterbus_core::game_state::FibbingAction;
use banterbus_management::ManagementError;
use chrono::{DateTime, Utc};

/// Failures surfaced by the engine. Services translate these into the
/// user-facing error frames.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("expected action to be {expected}, current action {current}")]
    InvalidAction {
        expected: FibbingAction,
        current: FibbingAction,
    },

    #[error("invalid game state: {0}")]
    InvalidGameState(String),

    /// The submission window has closed.
    #[error("cannot complete action out of time")]
    ActionTimedOut {
        now: DateTime<Utc>,
        completed_by: DateTime<Utc>,
    },

    /// The submission window is still open, so answers may not be filled in.
    #[error("cannot complete action, it is not yet out of time")]
    ActionNotTimedOut,

    #[error("{0}")]
    InvalidAnswer(String),

    #[error("no answers found for question")]
    NoAnswersFound,

    #[error("unexpected game round {0}")]
    InvalidGameRound(String),

    /// A question group came back with fewer than two distinct questions.
    #[error("not enough questions in group {group}")]
    NotEnoughQuestions { group: String },

    #[error("cannot build a starting state without players")]
    NoPlayers,

    #[error(transparent)]
    Catalog(#[from] ManagementError),
}
