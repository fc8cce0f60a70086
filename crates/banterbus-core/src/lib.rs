pub mod events;
pub mod game_state;
pub mod player;
pub mod room;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_state::{
        FibbingAction, FibbingItQuestion, FibbingItQuestionsState, FibbingItRounds,
        FibbingItState, FibbingRound, GameSpecificState, GameState, PausedState, PlayerScore,
    };
    use crate::player::Player;

    /// Create `n` test players in the given room with sequential nicknames.
    pub fn make_players(n: usize, room_id: &str) -> Vec<Player> {
        (0..n)
            .map(|i| Player {
                player_id: format!("player-{}", i + 1),
                nickname: format!("Player{}", i + 1),
                avatar: vec![0xAA, i as u8],
                room_id: Some(room_id.to_string()),
                latest_sid: format!("sid-{}", i + 1),
                disconnected_at: None,
            })
            .collect()
    }

    /// A question with a closed answer set, as the opinion round uses.
    pub fn opinion_question(n: usize) -> FibbingItQuestion {
        FibbingItQuestion {
            fibber_question: format!("What do you hate about pizza {n}?"),
            question: format!("What do you love about pizza {n}?"),
            answers: Some(vec![
                "lame".to_string(),
                "tasty".to_string(),
                "cheesy".to_string(),
            ]),
        }
    }

    /// A starting FibbingIt state: three questions per round, cursor before
    /// the first question.
    pub fn starting_fibbing_state(fibber_id: &str, nicknames: &[String]) -> FibbingItState {
        let likely = (0..3)
            .map(|n| FibbingItQuestion {
                fibber_question: String::new(),
                question: format!("Most likely to {n}?"),
                answers: Some(nicknames.to_vec()),
            })
            .collect();
        let free_form = (0..3)
            .map(|n| FibbingItQuestion {
                fibber_question: format!("Fibber free form {n}?"),
                question: format!("Free form {n}?"),
                answers: None,
            })
            .collect();
        FibbingItState {
            current_fibber_id: fibber_id.to_string(),
            current_round: FibbingRound::Opinion,
            questions: FibbingItQuestionsState {
                rounds: FibbingItRounds {
                    opinion: (0..3).map(opinion_question).collect(),
                    likely,
                    free_form,
                },
                question_nb: -1,
                current_answers: Default::default(),
            },
        }
    }

    /// A freshly created game state for the given players.
    pub fn make_game_state(room_id: &str, players: &[Player]) -> GameState {
        let nicknames: Vec<String> = players.iter().map(|p| p.nickname.clone()).collect();
        GameState {
            room_id: room_id.to_string(),
            game_name: "fibbing_it".to_string(),
            player_scores: players
                .iter()
                .map(|p| PlayerScore {
                    player_id: p.player_id.clone(),
                    score: 0,
                })
                .collect(),
            state: GameSpecificState::FibbingIt(starting_fibbing_state(
                &players[0].player_id,
                &nicknames,
            )),
            action: FibbingAction::ShowQuestion,
            action_completed_by: None,
            answers_expected_by_time: None,
            paused: PausedState::default(),
        }
    }
}
