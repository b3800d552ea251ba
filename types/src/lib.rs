//! Types shared by the tally ledger and server.

mod constants;
mod error;
mod ledger;
mod player;
mod result;

pub use constants::*;
pub use error::ValidationError;
pub use ledger::*;
pub use player::*;
pub use result::*;

#[cfg(test)]
mod tests;
