//! Account operations

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Account, AccountSummary};

/// Insert accounts whose number is not yet stored, returning how many were new
pub(super) fn insert_accounts(conn: &Connection, accounts: &[Account]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO accounts (number, name) VALUES (?, ?) ON CONFLICT (number) DO NOTHING",
    )?;
    let mut written = 0;
    for account in accounts {
        written += stmt.execute(params![account.number, account.name])?;
    }
    Ok(written)
}

/// Resolve an account number to its row ID
pub(super) fn account_id(conn: &Connection, number: &str) -> Result<i64> {
    conn.query_row(
        "SELECT id FROM accounts WHERE number = ?",
        params![number],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| Error::UnknownAccount(number.to_string()))
}

impl Database {
    /// Store accounts not seen before; existing accounts are left untouched
    pub fn add_accounts(&self, accounts: &[Account]) -> Result<usize> {
        let _guard = self.write_lock()?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let written = insert_accounts(&tx, accounts)?;
        tx.commit()?;

        debug!("Added {} of {} account(s)", written, accounts.len());
        Ok(written)
    }

    /// List all accounts with their record counts
    pub fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        let _guard = self.read_lock()?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT a.number, a.name, COUNT(r.id)
            FROM accounts a
            LEFT JOIN records r ON r.account_id = a.id
            GROUP BY a.id
            ORDER BY a.number
            "#,
        )?;

        let accounts = stmt
            .query_map([], |row| {
                Ok(AccountSummary {
                    account: Account {
                        number: row.get(0)?,
                        name: row.get(1)?,
                    },
                    records: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }
}
