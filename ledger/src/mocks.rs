//! Storage fault injection for tests, here and in dependent crates.

use rusqlite::params;

use crate::{Error, Ledger};

/// Make every debt insert of exactly `amount` abort, as a failing disk or a
/// violated constraint would.
pub fn fail_debts_of(ledger: &Ledger, amount: u64) -> Result<(), Error> {
    let conn = ledger.lock()?;
    conn.execute_batch(&format!(
        "CREATE TRIGGER fail_debts_of_{amount} BEFORE INSERT ON debts
         WHEN NEW.amount = {amount}
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"
    ))?;
    Ok(())
}

/// Store a debt of `i64::MAX` from `debtor` to `creditor` without touching
/// balances. Any later credit to `creditor` overflows the debt total, so the
/// balance check inside [Ledger::record] fails.
pub fn seed_overflowing_debt(ledger: &Ledger, debtor: &str, creditor: &str) -> Result<(), Error> {
    let conn = ledger.lock()?;
    conn.execute("INSERT INTO results (date) VALUES ('1970-01-01')", [])?;
    let result_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO debts (result_id, date, debtor, creditor, amount)
         VALUES (?1, '1970-01-01', ?2, ?3, ?4)",
        params![result_id, debtor, creditor, i64::MAX],
    )?;
    Ok(())
}
