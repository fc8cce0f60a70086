//! Payload models for client-to-server events.

use serde::Deserialize;

use super::{InboundEvent, avatar};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRoom {}

impl InboundEvent for CreateRoom {
    const NAME: &'static str = "CREATE_ROOM";
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoom {
    pub nickname: String,
    #[serde(deserialize_with = "avatar::deserialize")]
    pub avatar: Vec<u8>,
    pub room_code: String,
}

impl InboundEvent for JoinRoom {
    const NAME: &'static str = "JOIN_ROOM";

    fn room_scope(&self) -> Option<&str> {
        Some(&self.room_code)
    }
}

/// Rejoin carries only the player id; the room is resolved from the player
/// record, so there is no lock scope up front.
#[derive(Debug, Clone, Deserialize)]
pub struct RejoinRoom {
    pub player_id: String,
}

impl InboundEvent for RejoinRoom {
    const NAME: &'static str = "REJOIN_ROOM";
}

#[derive(Debug, Clone, Deserialize)]
pub struct KickPlayer {
    pub kick_player_nickname: String,
    pub player_id: String,
    pub room_code: String,
}

impl InboundEvent for KickPlayer {
    const NAME: &'static str = "KICK_PLAYER";

    fn room_scope(&self) -> Option<&str> {
        Some(&self.room_code)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartGame {
    pub player_id: String,
    pub game_name: String,
    pub room_code: String,
}

impl InboundEvent for StartGame {
    const NAME: &'static str = "START_GAME";

    fn room_scope(&self) -> Option<&str> {
        Some(&self.room_code)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetNextQuestion {
    pub player_id: String,
    pub room_code: String,
}

impl InboundEvent for GetNextQuestion {
    const NAME: &'static str = "GET_NEXT_QUESTION";

    fn room_scope(&self) -> Option<&str> {
        Some(&self.room_code)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PauseGame {
    pub player_id: String,
    pub room_code: String,
}

impl InboundEvent for PauseGame {
    const NAME: &'static str = "PAUSE_GAME";

    fn room_scope(&self) -> Option<&str> {
        Some(&self.room_code)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnpauseGame {
    pub player_id: String,
    pub room_code: String,
}

impl InboundEvent for UnpauseGame {
    const NAME: &'static str = "UNPAUSE_GAME";

    fn room_scope(&self) -> Option<&str> {
        Some(&self.room_code)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PermanentlyDisconnectPlayer {
    pub nickname: String,
    pub room_code: String,
}

impl InboundEvent for PermanentlyDisconnectPlayer {
    const NAME: &'static str = "PERMANENTLY_DISCONNECT_PLAYER";

    fn room_scope(&self) -> Option<&str> {
        Some(&self.room_code)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswerFibbingIt {
    pub player_id: String,
    pub answer: String,
    pub room_code: String,
}

impl InboundEvent for SubmitAnswerFibbingIt {
    const NAME: &'static str = "SUBMIT_ANSWER_FIBBING_IT";

    fn room_scope(&self) -> Option<&str> {
        Some(&self.room_code)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetAnswersFibbingIt {
    pub player_id: String,
    pub room_code: String,
}

impl InboundEvent for GetAnswersFibbingIt {
    const NAME: &'static str = "GET_ANSWERS_FIBBING_IT";

    fn room_scope(&self) -> Option<&str> {
        Some(&self.room_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_room_decodes_with_base64_avatar() {
        let join: JoinRoom = serde_json::from_str(
            r#"{"nickname":"Majiy","avatar":"aGk=","room_code":"abc"}"#,
        )
        .unwrap();
        assert_eq!(join.nickname, "Majiy");
        assert_eq!(join.avatar, b"hi");
        assert_eq!(join.room_scope(), Some("abc"));
    }

    #[test]
    fn join_room_requires_all_fields() {
        let result: Result<JoinRoom, _> =
            serde_json::from_str(r#"{"nickname":"Majiy","room_code":"abc"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejoin_has_no_room_scope() {
        let rejoin: RejoinRoom = serde_json::from_str(r#"{"player_id":"p1"}"#).unwrap();
        assert_eq!(rejoin.room_scope(), None);
    }
}
