//! Client for the management service, which owns the question catalog.
//!
//! The core API never caches catalog data; every game start fetches fresh
//! game metadata and question sets. The [`GameCatalog`] and
//! [`QuestionCatalog`] traits are the seams the game engine and lobby are
//! written against, so tests can substitute a canned catalog.

mod client;
mod models;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use client::ManagementClient;
pub use models::{GameInfo, QuestionGroups, RandomQuestion};

use async_trait::async_trait;

/// Errors from the management service.
#[derive(Debug, thiserror::Error)]
pub enum ManagementError {
    /// A non-success HTTP status. 404 on game lookup means the game does
    /// not exist; anything else is unexpected.
    #[error("management service returned {status} for {endpoint}")]
    UnexpectedResponse { status: u16, endpoint: String },

    #[error("management request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl ManagementError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnexpectedResponse { status: 404, .. })
    }
}

/// Game metadata lookups.
#[async_trait]
pub trait GameCatalog: Send + Sync {
    async fn get_game(&self, game_name: &str) -> Result<GameInfo, ManagementError>;
}

/// Random question and question-group retrieval.
#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    async fn get_random_groups(
        &self,
        game_name: &str,
        round: &str,
        limit: usize,
    ) -> Result<QuestionGroups, ManagementError>;

    async fn get_random_questions(
        &self,
        game_name: &str,
        round: &str,
        group_name: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<RandomQuestion>, ManagementError>;
}
