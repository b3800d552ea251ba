//! Records session results, settles them into transfers, and keeps running
//! balances in SQLite.

mod error;
pub mod rule;
mod store;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use error::Error;
pub use rule::{schedule, settle, Payout};
pub use store::{Ledger, Recorded};
