//! Record operations

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use tracing::debug;

use super::accounts::{account_id, insert_accounts};
use super::{parse_date, Database};
use crate::error::Result;
use crate::models::{Account, Record, Writes, DATE_FORMAT};

/// Insert records not yet stored under their natural key, returning how many
/// were new
fn insert_records(conn: &Connection, account_id: i64, records: &[Record]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        r#"
        INSERT INTO records (account_id, time, text, amount, balance)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (account_id, time, text, amount) DO NOTHING
        "#,
    )?;
    let mut written = 0;
    for record in records {
        written += stmt.execute(params![
            account_id,
            record.time.format(DATE_FORMAT).to_string(),
            record.text,
            record.amount,
            record.balance.unwrap_or(0),
        ])?;
    }
    Ok(written)
}

impl Database {
    /// Store records for the account `number`, skipping those already stored.
    ///
    /// Fails with [`crate::Error::UnknownAccount`] if the account was never
    /// added. Nothing is written unless every insert succeeds.
    pub fn add_records(&self, number: &str, records: &[Record]) -> Result<usize> {
        let _guard = self.write_lock()?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = account_id(&tx, number)?;
        let written = insert_records(&tx, id, records)?;
        tx.commit()?;

        debug!(
            "Added {} of {} record(s) for account {}",
            written,
            records.len(),
            number
        );
        Ok(written)
    }

    /// Store `accounts` and then the records of account `number` in one
    /// transaction
    pub fn write_batch(
        &self,
        accounts: &[Account],
        number: &str,
        records: &[Record],
    ) -> Result<Writes> {
        let _guard = self.write_lock()?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let new_accounts = insert_accounts(&tx, accounts)?;
        let id = account_id(&tx, number)?;
        let new_records = insert_records(&tx, id, records)?;
        tx.commit()?;

        debug!(
            "Wrote {} account(s) and {} of {} record(s) for account {}",
            new_accounts,
            new_records,
            records.len(),
            number
        );
        Ok(Writes {
            accounts: new_accounts,
            records: new_records,
        })
    }

    /// Records dated within `[since, until]`, newest first
    ///
    /// An absent or empty `number` selects every account; an absent bound is
    /// open on that side.
    pub fn select_records_between(
        &self,
        number: Option<&str>,
        since: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<Record>> {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(number) = number.filter(|n| !n.is_empty()) {
            conditions.push("a.number = ?");
            params.push(Box::new(number.to_string()));
        }
        if let Some(since) = since {
            conditions.push("r.time >= ?");
            params.push(Box::new(since.format(DATE_FORMAT).to_string()));
        }
        if let Some(until) = until {
            conditions.push("r.time <= ?");
            params.push(Box::new(until.format(DATE_FORMAT).to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT a.number, a.name, r.time, r.text, r.amount, r.balance
            FROM records r
            JOIN accounts a ON a.id = r.account_id
            {}
            ORDER BY r.time DESC, r.id ASC
            "#,
            where_clause
        );

        let _guard = self.read_lock()?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let records = stmt
            .query_map(params_refs.as_slice(), Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<Record> {
        let time: String = row.get(2)?;
        let balance: i64 = row.get(5)?;
        Ok(Record {
            account: Account {
                number: row.get(0)?,
                name: row.get(1)?,
            },
            time: parse_date(2, &time)?,
            text: row.get(3)?,
            amount: row.get(4)?,
            balance: Some(balance).filter(|b| *b != 0),
        })
    }
}
