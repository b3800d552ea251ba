use tally_types::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("ledger connection lock poisoned")]
    Poisoned,
}
