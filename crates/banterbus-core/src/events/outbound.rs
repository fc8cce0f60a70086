//! Payload models for server-to-client events.

use serde::Serialize;

use super::{OutboundEvent, avatar};
use crate::player::Player;

/// The slice of a player shown to other room members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerInfo {
    pub nickname: String,
    #[serde(serialize_with = "avatar::serialize")]
    pub avatar: Vec<u8>,
}

impl From<&Player> for PlayerInfo {
    fn from(player: &Player) -> Self {
        Self {
            nickname: player.nickname.clone(),
            avatar: player.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomCreated {
    pub room_code: String,
}

impl OutboundEvent for RoomCreated {
    const NAME: &'static str = "ROOM_CREATED";
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomJoined {
    pub host_player_nickname: String,
    pub players: Vec<PlayerInfo>,
}

impl OutboundEvent for RoomJoined {
    const NAME: &'static str = "ROOM_JOINED";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRoomJoined {
    pub player_id: String,
}

impl OutboundEvent for NewRoomJoined {
    const NAME: &'static str = "NEW_ROOM_JOINED";
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerKicked {
    pub nickname: String,
}

impl OutboundEvent for PlayerKicked {
    const NAME: &'static str = "PLAYER_KICKED";
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerDisconnected {
    pub nickname: String,
    #[serde(serialize_with = "avatar::serialize")]
    pub avatar: Vec<u8>,
}

impl OutboundEvent for PlayerDisconnected {
    const NAME: &'static str = "PLAYER_DISCONNECTED";
}

#[derive(Debug, Clone, Serialize)]
pub struct HostDisconnected {
    pub new_host_nickname: String,
}

impl OutboundEvent for HostDisconnected {
    const NAME: &'static str = "HOST_DISCONNECTED";
}

#[derive(Debug, Clone, Serialize)]
pub struct PermanentlyDisconnectedPlayer {
    pub nickname: String,
}

impl OutboundEvent for PermanentlyDisconnectedPlayer {
    const NAME: &'static str = "PERMANENTLY_DISCONNECTED_PLAYER";
}

#[derive(Debug, Clone, Serialize)]
pub struct GameStarted {
    pub game_name: String,
}

impl OutboundEvent for GameStarted {
    const NAME: &'static str = "GAME_STARTED";
}

/// Whether the question just served opened a new round, and which.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuestionRoundState {
    pub round_changed: bool,
    pub new_round: String,
}

/// The question as one player sees it. The fibber is shown their decoy
/// question instead of the real one.
#[derive(Debug, Clone, Serialize)]
pub struct GotQuestionFibbingIt {
    pub is_fibber: bool,
    pub question: String,
    pub answers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GotNextQuestion {
    pub question: GotQuestionFibbingIt,
    pub updated_round: UpdateQuestionRoundState,
    pub timer_in_seconds: i64,
}

impl OutboundEvent for GotNextQuestion {
    const NAME: &'static str = "GOT_NEXT_QUESTION";
}

#[derive(Debug, Clone, Serialize)]
pub struct GamePaused {
    pub paused_for: i64,
    pub message: String,
}

impl OutboundEvent for GamePaused {
    const NAME: &'static str = "GAME_PAUSED";
}

#[derive(Debug, Clone, Serialize)]
pub struct GameUnpaused {}

impl OutboundEvent for GameUnpaused {
    const NAME: &'static str = "GAME_UNPAUSED";
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerSubmittedFibbingIt {
    pub all_players_submitted: bool,
}

impl OutboundEvent for AnswerSubmittedFibbingIt {
    const NAME: &'static str = "ANSWER_SUBMITTED_FIBBING_IT";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FibbingItAnswer {
    pub nickname: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GotAnswersFibbingIt {
    pub answers: Vec<FibbingItAnswer>,
    pub timer_in_seconds: i64,
}

impl OutboundEvent for GotAnswersFibbingIt {
    const NAME: &'static str = "GOT_ANSWERS_FIBBING_IT";
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub code: String,
    pub message: String,
}

impl ErrorEvent {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl OutboundEvent for ErrorEvent {
    const NAME: &'static str = "ERROR";
}
