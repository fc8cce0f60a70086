use banterbus_core::game_state::FibbingAction;
use banterbus_core::room::RoomState;
use banterbus_fibbing_it::EngineError;
use banterbus_management::ManagementError;

/// Every failure a service or handler can surface. Handlers translate the
/// cases they own into specific error frames; anything that reaches the
/// dispatcher unmapped becomes a generic `server_error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Not found.
    #[error("room {room_id} not found")]
    RoomNotFound { room_id: String },

    #[error("player {player_id} not found")]
    PlayerNotFound { player_id: String },

    #[error("game {game_name} not found")]
    GameNotFound { game_name: String },

    #[error("game state for room {room_id} not found")]
    GameStateNotFound { room_id: String },

    // Exists.
    #[error("room {room_id} already exists")]
    RoomExists { room_id: String },

    #[error("player {player_id} already exists")]
    PlayerExists { player_id: String },

    #[error("nickname {nickname} already exists")]
    NicknameExists { nickname: String },

    #[error("game state for room {room_id} already exists")]
    GameStateExists { room_id: String },

    // Invalid state.
    #[error("expected room state {expected}, room is in state {actual}")]
    RoomInInvalidState {
        expected: RoomState,
        actual: RoomState,
    },

    #[error("room {room_id} is not joinable in state {state}")]
    RoomNotJoinable { room_id: String, state: RoomState },

    #[error("room {room_id} has no host")]
    RoomHasNoHost { room_id: String },

    #[error("player {player_id} is not the host")]
    PlayerNotHost {
        player_id: String,
        host_player_id: String,
    },

    #[error("player {player_id} has no room")]
    PlayerHasNoRoom { player_id: String },

    #[error("player {player_id} is not in room {room_id}")]
    PlayerNotInRoom { player_id: String, room_id: String },

    #[error("no other host candidate in room {room_id}")]
    NoOtherHost { room_id: String },

    #[error("game {game_name} is not enabled")]
    GameNotEnabled { game_name: String },

    #[error("game state for room {room_id} is already paused")]
    GameStateAlreadyPaused { room_id: String },

    #[error("game state for room {room_id} is not paused")]
    GameStateNotPaused { room_id: String },

    #[error("game in room {room_id} is paused")]
    GameIsPaused { room_id: String },

    #[error("expected game action to be {expected}")]
    InvalidGameAction { expected: FibbingAction },

    #[error("game state has no further questions")]
    GameStateIsNone,

    // Input.
    #[error(
        "too many players in room {room_id} for {game_name}: {player_count} > {maximum_players}"
    )]
    TooManyPlayersInRoom {
        room_id: String,
        game_name: String,
        player_count: u32,
        maximum_players: u32,
    },

    #[error(
        "too few players in room {room_id} for {game_name}: {player_count} < {minimum_players}"
    )]
    TooFewPlayersInRoom {
        room_id: String,
        game_name: String,
        player_count: u32,
        minimum_players: u32,
    },

    #[error("incorrectly formatted payload: {0}")]
    IncorrectFormat(String),

    // Internal.
    #[error("{0}")]
    Internal(String),

    #[error("store failure: {0}")]
    Store(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Management(ManagementError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable code for the `ERROR` frame when no handler mapped the failure
    /// to a more specific one.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PlayerNotInRoom { .. } => "player_not_in_room",
            Self::Engine(EngineError::ActionTimedOut { .. }) => "time_run_out",
            _ => "server_error",
        }
    }

    /// Message safe to show to clients. Internal detail stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PlayerNotInRoom { .. } => "Player not in room",
            Self::Engine(EngineError::ActionTimedOut { .. }) => {
                "Cannot submit answer, time has run out"
            }
            _ => "An unexpected error occurred on the server",
        }
    }
}
