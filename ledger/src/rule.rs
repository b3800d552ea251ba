//! Maps a finishing order to the transfers it settles into.
//!
//! Payouts are a fixed lookup by player count. The bottom finishers pay the
//! top finishers, paired from the outside in: last pays first [FIRST_BOUNTY],
//! second-to-last pays second [SECOND_BOUNTY], and with six players
//! third-to-last pays third [THIRD_BOUNTY]. With an odd count the median
//! player neither pays nor receives.

use tally_types::{
    FinishingOrder, SessionDate, Transfer, FIRST_BOUNTY, SECOND_BOUNTY, THIRD_BOUNTY,
};

/// One row of the payout table, in finishing-order indices (0 = winner).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payout {
    pub debtor: usize,
    pub creditor: usize,
    pub amount: u64,
}

const fn payout(debtor: usize, creditor: usize, amount: u64) -> Payout {
    Payout {
        debtor,
        creditor,
        amount,
    }
}

const SIX: [Payout; 3] = [
    payout(5, 0, FIRST_BOUNTY),
    payout(4, 1, SECOND_BOUNTY),
    payout(3, 2, THIRD_BOUNTY),
];
const FIVE: [Payout; 2] = [payout(4, 0, FIRST_BOUNTY), payout(3, 1, SECOND_BOUNTY)];
const FOUR: [Payout; 2] = [payout(3, 0, FIRST_BOUNTY), payout(2, 1, SECOND_BOUNTY)];
const THREE: [Payout; 1] = [payout(2, 0, FIRST_BOUNTY)];
const TWO: [Payout; 1] = [payout(1, 0, FIRST_BOUNTY)];

/// Payout table for a session with `players` finishers.
///
/// Counts outside the supported range settle into nothing.
pub fn schedule(players: usize) -> &'static [Payout] {
    match players {
        6 => &SIX,
        5 => &FIVE,
        4 => &FOUR,
        3 => &THREE,
        2 => &TWO,
        _ => &[],
    }
}

/// Resolve the payout table against a concrete finishing order.
pub fn settle(date: SessionDate, order: &FinishingOrder) -> Vec<Transfer> {
    let players = order.players();
    schedule(players.len())
        .iter()
        .map(|p| Transfer {
            date,
            debtor: players[p.debtor].clone(),
            creditor: players[p.creditor].clone(),
            amount: p.amount,
        })
        .collect()
}
