//! Event handler compositions, one function per inbound event plus the
//! transport disconnect callback. Handlers return the emits they want
//! fanned out; the dispatcher delivers them and maps stray failures.

pub mod game;
pub mod lobby;
pub mod room;
