//! SQLite persistence for results, debts and balances.
//!
//! Only this module talks to the database. Every mutating operation runs in a
//! single transaction and commits only when every statement succeeded.

use rusqlite::{params, types::Type, Connection, Transaction};
use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Mutex, MutexGuard},
};
use tally_types::{
    Balance, BalancesView, DebtPair, Drift, Player, Rankings, ResultRecord, SessionDate,
    Submission, Transfer,
};
use tracing::{debug, info, warn};

use crate::{rule::settle, Error};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS results (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    date     TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS placements (
    result_id INTEGER NOT NULL REFERENCES results (id),
    position  INTEGER NOT NULL,
    player    TEXT    NOT NULL,
    PRIMARY KEY (result_id, position)
);
CREATE TABLE IF NOT EXISTS debts (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    result_id INTEGER NOT NULL REFERENCES results (id),
    date      TEXT    NOT NULL,
    debtor    TEXT    NOT NULL,
    creditor  TEXT    NOT NULL,
    amount    INTEGER NOT NULL CHECK (amount > 0)
);
CREATE TABLE IF NOT EXISTS balances (
    player   TEXT    PRIMARY KEY,
    balance  INTEGER NOT NULL DEFAULT 0
);
";

/// Outcome of recording one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recorded {
    pub result_id: i64,
    pub transfers: Vec<Transfer>,
}

/// The settlement ledger backed by a single SQLite database.
///
/// The connection is guarded by a mutex so concurrent requests are serialized
/// at the statement level. Nothing is cached: every view re-reads the tables.
pub struct Ledger {
    conn: Mutex<Connection>,
}

impl Ledger {
    /// Open (or create) the ledger database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    /// Open an in-memory ledger (used in tests).
    pub fn in_memory() -> Result<Self, Error> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, Error> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.conn.lock().map_err(|e| {
            tracing::error!("Failed to acquire ledger lock: {}", e);
            Error::Poisoned
        })
    }

    /// Record a validated session and apply every transfer it settles into.
    ///
    /// The result, its placements, the debts and the balance updates commit
    /// together or not at all. Balances are checked against the debts before
    /// committing, so an error always means nothing was written.
    pub fn record(&self, submission: &Submission) -> Result<Recorded, Error> {
        let transfers = settle(submission.date, &submission.order);

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let result_id = insert_result(&tx, submission)?;
        for transfer in &transfers {
            apply_transfer(&tx, result_id, transfer)?;
        }
        let drift = find_drift(&tx)?;
        tx.commit()?;

        if !drift.is_empty() {
            warn!(?drift, "balances no longer match debts");
        }
        info!(
            result_id,
            date = %submission.date,
            players = submission.order.len(),
            transfers = transfers.len(),
            "recorded result"
        );
        Ok(Recorded {
            result_id,
            transfers,
        })
    }

    /// Current balances and the historical total between every debtor and
    /// creditor pair.
    pub fn balances(&self) -> Result<BalancesView, Error> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT player, balance FROM balances
             ORDER BY balance DESC, player ASC",
        )?;
        let balances = stmt
            .query_map([], |row| {
                Ok(Balance {
                    player: Player::new(row.get::<_, String>(0)?),
                    balance: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT debtor, creditor, SUM(amount) FROM debts
             GROUP BY debtor, creditor
             ORDER BY debtor ASC, creditor ASC",
        )?;
        let debts = stmt
            .query_map([], |row| {
                Ok(DebtPair {
                    debtor: Player::new(row.get::<_, String>(0)?),
                    creditor: Player::new(row.get::<_, String>(1)?),
                    total: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BalancesView { balances, debts })
    }

    /// Every recorded session, newest first, with its finishing order.
    pub fn rankings(&self) -> Result<Rankings, Error> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT r.id, r.date, p.player
             FROM results r JOIN placements p ON p.result_id = r.id
             ORDER BY r.id DESC, p.position ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let date: String = row.get(1)?;
                let date = date.parse::<SessionDate>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
                })?;
                Ok((
                    row.get::<_, i64>(0)?,
                    date,
                    Player::new(row.get::<_, String>(2)?),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut results: Vec<ResultRecord> = Vec::new();
        for (id, date, player) in rows {
            match results.last_mut() {
                Some(last) if last.id == id => last.players.push(player),
                _ => results.push(ResultRecord {
                    id,
                    date,
                    players: vec![player],
                }),
            }
        }
        Ok(Rankings { results })
    }

    /// Delete every result, debt and balance. Resetting an empty ledger is a
    /// no-op.
    pub fn reset(&self) -> Result<(), Error> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM debts;
             DELETE FROM placements;
             DELETE FROM balances;
             DELETE FROM results;",
        )?;
        tx.commit()?;
        info!("ledger reset");
        Ok(())
    }

    /// Compare stored balances with the totals implied by the debts table.
    ///
    /// Returns every player whose stored balance has drifted; an empty list
    /// means the ledger is consistent.
    pub fn audit(&self) -> Result<Vec<Drift>, Error> {
        let conn = self.lock()?;
        let drift = find_drift(&conn)?;
        if drift.is_empty() {
            debug!("ledger audit passed");
        } else {
            warn!(players = drift.len(), "ledger audit found drift");
        }
        Ok(drift)
    }
}

fn find_drift(conn: &Connection) -> Result<Vec<Drift>, Error> {
    let mut expected: BTreeMap<String, i64> = BTreeMap::new();
    let mut stmt = conn.prepare(
        "SELECT player, SUM(delta) FROM (
             SELECT creditor AS player, amount AS delta FROM debts
             UNION ALL
             SELECT debtor AS player, -amount AS delta FROM debts
         ) GROUP BY player",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (player, total) = row?;
        expected.insert(player, total);
    }

    let mut recorded: BTreeMap<String, i64> = BTreeMap::new();
    let mut stmt = conn.prepare("SELECT player, balance FROM balances")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (player, balance) = row?;
        recorded.insert(player, balance);
    }

    let mut players: Vec<&String> = expected.keys().chain(recorded.keys()).collect();
    players.sort();
    players.dedup();

    Ok(players
        .into_iter()
        .filter_map(|player| {
            let expected = expected.get(player).copied().unwrap_or_default();
            let recorded = recorded.get(player).copied().unwrap_or_default();
            (expected != recorded).then(|| Drift {
                player: Player::new(player.clone()),
                recorded,
                expected,
            })
        })
        .collect())
}

fn insert_result(tx: &Transaction<'_>, submission: &Submission) -> Result<i64, Error> {
    tx.execute(
        "INSERT INTO results (date) VALUES (?1)",
        params![submission.date.to_string()],
    )?;
    let result_id = tx.last_insert_rowid();

    let mut stmt =
        tx.prepare("INSERT INTO placements (result_id, position, player) VALUES (?1, ?2, ?3)")?;
    for (position, player) in submission.order.players().iter().enumerate() {
        stmt.execute(params![result_id, position as i64, player.name()])?;
    }
    Ok(result_id)
}

fn apply_transfer(tx: &Transaction<'_>, result_id: i64, transfer: &Transfer) -> Result<(), Error> {
    let amount = transfer.amount as i64;
    tx.execute(
        "INSERT INTO debts (result_id, date, debtor, creditor, amount)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            result_id,
            transfer.date.to_string(),
            transfer.debtor.name(),
            transfer.creditor.name(),
            amount,
        ],
    )?;

    // Missing rows start at zero, so inserting the delta is the same as
    // creating the row and then adjusting it
    let mut stmt = tx.prepare(
        "INSERT INTO balances (player, balance) VALUES (?1, ?2)
         ON CONFLICT (player) DO UPDATE SET balance = balance + excluded.balance",
    )?;
    stmt.execute(params![transfer.debtor.name(), -amount])?;
    stmt.execute(params![transfer.creditor.name(), amount])?;

    debug!(
        debtor = %transfer.debtor,
        creditor = %transfer.creditor,
        amount = transfer.amount,
        "applied transfer"
    );
    Ok(())
}
