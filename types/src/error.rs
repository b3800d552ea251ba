use thiserror::Error;

use crate::{MAX_PLAYERS, MIN_PLAYERS};

/// Reasons a submission or roster is rejected before touching storage.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid player: {0}")]
    UnknownPlayer(String),
    #[error("a session needs between {MIN_PLAYERS} and {MAX_PLAYERS} players (got {0})")]
    PlayerCount(usize),
    #[error("player listed more than once: {0}")]
    DuplicatePlayer(String),
    #[error("invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("roster is empty")]
    EmptyRoster,
    #[error("roster lists {0} more than once")]
    DuplicateRosterEntry(String),
}
