use serde::Serialize;

use crate::{Player, ResultRecord, SessionDate};

/// A single debtor to creditor movement produced by settling one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub date: SessionDate,
    pub debtor: Player,
    pub creditor: Player,
    pub amount: u64,
}

/// Running net total for one player (negative = owes money).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub player: Player,
    pub balance: i64,
}

/// Sum of every amount ever moved from `debtor` to `creditor`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DebtPair {
    pub debtor: Player,
    pub creditor: Player,
    pub total: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BalancesView {
    pub balances: Vec<Balance>,
    pub debts: Vec<DebtPair>,
}

impl BalancesView {
    pub fn balance_of(&self, player: &str) -> Option<i64> {
        self.balances
            .iter()
            .find(|b| b.player.name() == player)
            .map(|b| b.balance)
    }
}

/// Recorded sessions, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rankings {
    pub results: Vec<ResultRecord>,
}

/// A player whose stored balance disagrees with the sum of their debts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub player: Player,
    pub recorded: i64,
    pub expected: i64,
}
