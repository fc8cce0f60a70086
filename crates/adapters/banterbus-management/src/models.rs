use serde::Deserialize;

/// Game metadata as served by `GET /game/{game_name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GameInfo {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub enabled: bool,
    pub rules_url: String,
    pub minimum_players: u32,
    pub maximum_players: u32,
}

/// Response of `GET /game/{game_name}/question/group:random`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionGroups {
    pub groups: Vec<String>,
}

/// One entry of `GET /game/{game_name}/question:random`. Within a question
/// group, `kind` distinguishes questions from canned answers.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomQuestion {
    #[serde(default)]
    pub question_id: Option<String>,
    pub content: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl RandomQuestion {
    pub fn is_question(&self) -> bool {
        self.kind.as_deref() == Some("question")
    }

    pub fn is_answer(&self) -> bool {
        self.kind.as_deref() == Some("answer")
    }
}
