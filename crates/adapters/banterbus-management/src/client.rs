use async_trait::async_trait;
use reqwest::StatusCode;

use crate::models::{GameInfo, QuestionGroups, RandomQuestion};
use crate::{GameCatalog, ManagementError, QuestionCatalog};

/// HTTP client against the management service.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    base_url: String,
    client: reqwest::Client,
}

impl ManagementClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .user_agent(concat!("banterbus-core-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");
        Self { base_url, client }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: String,
        query: &[(&str, String)],
    ) -> Result<T, ManagementError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "management request");
        let resp = self.client.get(&url).query(query).send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ManagementError::UnexpectedResponse {
                status: status.as_u16(),
                endpoint,
            });
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl GameCatalog for ManagementClient {
    async fn get_game(&self, game_name: &str) -> Result<GameInfo, ManagementError> {
        self.get_json(format!("/game/{game_name}"), &[]).await
    }
}

#[async_trait]
impl QuestionCatalog for ManagementClient {
    async fn get_random_groups(
        &self,
        game_name: &str,
        round: &str,
        limit: usize,
    ) -> Result<QuestionGroups, ManagementError> {
        self.get_json(
            format!("/game/{game_name}/question/group:random"),
            &[
                ("round", round.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn get_random_questions(
        &self,
        game_name: &str,
        round: &str,
        group_name: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<RandomQuestion>, ManagementError> {
        let mut query = vec![("round", round.to_string())];
        if let Some(group) = group_name {
            query.push(("group_name", group.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.get_json(format!("/game/{game_name}/question:random"), &query)
            .await
    }
}
