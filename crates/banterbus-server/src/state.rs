use std::sync::Arc;

use banterbus_management::{GameCatalog, QuestionCatalog};

use crate::config::Settings;
use crate::dispatcher::RoomLocks;
use crate::services::{GameStateService, LobbyService, PlayerService, RoomService};
use crate::store::{GameStateRepository, PlayerRepository, RoomRepository};
use crate::transport::Transport;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub players: PlayerService,
    pub rooms: RoomService,
    pub lobby: LobbyService,
    pub game_state: GameStateService,
    pub games: Arc<dyn GameCatalog>,
    pub transport: Arc<dyn Transport>,
    pub locks: Arc<RoomLocks>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        room_repo: Arc<dyn RoomRepository>,
        player_repo: Arc<dyn PlayerRepository>,
        game_state_repo: Arc<dyn GameStateRepository>,
        games: Arc<dyn GameCatalog>,
        questions: Arc<dyn QuestionCatalog>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let players = PlayerService::new(player_repo);
        let rooms = RoomService::new(room_repo);
        let lobby = LobbyService::new(rooms.clone(), players.clone());
        let game_state =
            GameStateService::new(game_state_repo, questions, settings.questions_per_round);
        Self {
            settings: Arc::new(settings),
            players,
            rooms,
            lobby,
            game_state,
            games,
            transport,
            locks: Arc::new(RoomLocks::new()),
        }
    }
}
