//! Question selection at game start.
//!
//! The opinion and free_form rounds draw from question groups: each group is
//! expanded into its questions, two distinct ones are sampled (one becomes
//! the fibber's decoy) and, for opinion, the group's canned answers are
//! attached. The likely round skips groups and answers with the player
//! nicknames instead.

use banterbus_core::game_state::{FibbingItQuestion, FibbingItRounds, FibbingRound};
use banterbus_core::player::Player;
use banterbus_management::{QuestionCatalog, RandomQuestion};
use futures::future::try_join_all;
use rand::seq::index;

use crate::GAME_NAME;
use crate::error::EngineError;

pub(crate) async fn fetch_rounds(
    catalog: &dyn QuestionCatalog,
    players: &[Player],
    questions_per_round: usize,
) -> Result<FibbingItRounds, EngineError> {
    Ok(FibbingItRounds {
        opinion: grouped_round(catalog, FibbingRound::Opinion, questions_per_round).await?,
        likely: likely_round(catalog, players, questions_per_round).await?,
        free_form: grouped_round(catalog, FibbingRound::FreeForm, questions_per_round).await?,
    })
}

async fn grouped_round(
    catalog: &dyn QuestionCatalog,
    round: FibbingRound,
    questions_per_round: usize,
) -> Result<Vec<FibbingItQuestion>, EngineError> {
    let groups = catalog
        .get_random_groups(GAME_NAME, round.as_str(), questions_per_round)
        .await?;

    let fetches = groups.groups.iter().map(|group| {
        catalog.get_random_questions(GAME_NAME, round.as_str(), Some(group), None)
    });
    let per_group = try_join_all(fetches).await?;

    groups
        .groups
        .iter()
        .zip(per_group)
        .map(|(group, items)| build_question(round, group, items))
        .collect()
}

fn build_question(
    round: FibbingRound,
    group: &str,
    items: Vec<RandomQuestion>,
) -> Result<FibbingItQuestion, EngineError> {
    match round {
        FibbingRound::Opinion => {
            let questions: Vec<String> = items
                .iter()
                .filter(|item| item.is_question())
                .map(|item| item.content.clone())
                .collect();
            let answers: Vec<String> = items
                .iter()
                .filter(|item| item.is_answer())
                .map(|item| item.content.clone())
                .collect();
            let (fibber_question, question) = sample_two_distinct(group, &questions)?;
            Ok(FibbingItQuestion {
                fibber_question,
                question,
                answers: Some(answers),
            })
        }
        FibbingRound::FreeForm => {
            let questions: Vec<String> =
                items.into_iter().map(|item| item.content).collect();
            let (fibber_question, question) = sample_two_distinct(group, &questions)?;
            Ok(FibbingItQuestion {
                fibber_question,
                question,
                answers: None,
            })
        }
        FibbingRound::Likely => Err(EngineError::InvalidGameRound(round.to_string())),
    }
}

async fn likely_round(
    catalog: &dyn QuestionCatalog,
    players: &[Player],
    questions_per_round: usize,
) -> Result<Vec<FibbingItQuestion>, EngineError> {
    let questions = catalog
        .get_random_questions(
            GAME_NAME,
            FibbingRound::Likely.as_str(),
            None,
            Some(questions_per_round),
        )
        .await?;

    let nicknames: Vec<String> = players.iter().map(|p| p.nickname.clone()).collect();
    Ok(questions
        .into_iter()
        .map(|question| FibbingItQuestion {
            fibber_question: String::new(),
            question: question.content,
            answers: Some(nicknames.clone()),
        })
        .collect())
}

/// Sample two distinct questions from a group: one for the fibber, one for
/// everyone else.
fn sample_two_distinct(
    group: &str,
    questions: &[String],
) -> Result<(String, String), EngineError> {
    if questions.len() < 2 {
        return Err(EngineError::NotEnoughQuestions {
            group: group.to_string(),
        });
    }
    let picked = index::sample(&mut rand::rng(), questions.len(), 2);
    Ok((
        questions[picked.index(0)].clone(),
        questions[picked.index(1)].clone(),
    ))
}
