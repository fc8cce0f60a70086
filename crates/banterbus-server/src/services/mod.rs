//! Stateless service compositions over the repositories. Each service is a
//! cheap-to-clone struct of `Arc`s; per-room mutual exclusion is the
//! dispatcher's job, not theirs.

mod game_state;
mod lobby;
mod player;
mod room;

pub use game_state::{GameStateService, PAUSE_TIMER_IN_SECONDS};
pub use lobby::LobbyService;
pub use player::PlayerService;
pub use room::RoomService;
