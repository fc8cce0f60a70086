//! Canned catalog used by engine and server tests.

use async_trait::async_trait;

use crate::models::{GameInfo, QuestionGroups, RandomQuestion};
use crate::{GameCatalog, ManagementError, QuestionCatalog};

/// Deterministic in-memory catalog. Groups and questions are generated on
/// demand so any `limit` can be satisfied.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    pub enabled: bool,
    pub minimum_players: u32,
    pub maximum_players: u32,
    /// When set, `get_game` responds 404 for every game name.
    pub game_missing: bool,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self {
            enabled: true,
            minimum_players: 2,
            maximum_players: 10,
            game_missing: false,
        }
    }
}

impl StaticCatalog {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn missing() -> Self {
        Self {
            game_missing: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl GameCatalog for StaticCatalog {
    async fn get_game(&self, game_name: &str) -> Result<GameInfo, ManagementError> {
        if self.game_missing {
            return Err(ManagementError::UnexpectedResponse {
                status: 404,
                endpoint: format!("/game/{game_name}"),
            });
        }
        Ok(GameInfo {
            name: game_name.to_string(),
            display_name: "Fibbing It".to_string(),
            description: "Spot the fibber".to_string(),
            enabled: self.enabled,
            rules_url: "https://example.com/rules".to_string(),
            minimum_players: self.minimum_players,
            maximum_players: self.maximum_players,
        })
    }
}

#[async_trait]
impl QuestionCatalog for StaticCatalog {
    async fn get_random_groups(
        &self,
        _game_name: &str,
        round: &str,
        limit: usize,
    ) -> Result<QuestionGroups, ManagementError> {
        Ok(QuestionGroups {
            groups: (0..limit).map(|i| format!("{round}-group-{i}")).collect(),
        })
    }

    async fn get_random_questions(
        &self,
        _game_name: &str,
        round: &str,
        group_name: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<RandomQuestion>, ManagementError> {
        let question = |content: String, kind: &str| RandomQuestion {
            question_id: None,
            content,
            kind: Some(kind.to_string()),
        };

        let questions = match group_name {
            Some(group) => {
                // Grouped rounds: a handful of questions plus, for opinion,
                // the shared answer set of the group.
                let mut items: Vec<_> = (0..3)
                    .map(|i| question(format!("{group} question {i}"), "question"))
                    .collect();
                if round == "opinion" {
                    items.extend(
                        ["lame", "tasty", "cheesy"]
                            .into_iter()
                            .map(|a| question(a.to_string(), "answer")),
                    );
                }
                items
            }
            None => (0..limit.unwrap_or(1))
                .map(|i| question(format!("{round} question {i}"), "question"))
                .collect(),
        };

        Ok(questions)
    }
}
