//! Journal: configured accounts and rules on top of the record store

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::budget::Group;
use crate::classify::{Classifier, Period};
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::models::{Account, AccountSummary, Record, Writes};

/// A journal of financial records
#[derive(Clone)]
pub struct Journal {
    db: Database,
    accounts: Vec<Account>,
    classifier: Classifier,
    comma: String,
}

impl Journal {
    /// Open the store named by `config`
    pub fn open(config: Config) -> Result<Self> {
        let db = Database::new(&config.database)?;
        debug!("Opened journal at {}", db.path());
        Ok(Self::with_database(db, config))
    }

    /// Load the configuration at `path` and open its store
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Config::from_file(path)?)
    }

    /// Use an already opened store
    pub fn with_database(db: Database, config: Config) -> Self {
        Self {
            db,
            accounts: config.accounts,
            classifier: config.classifier,
            comma: config.comma,
        }
    }

    /// Configured accounts
    pub fn configured_accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Write the configured accounts, then `records` for account `number`.
    ///
    /// Both happen in one store transaction, so a failure writes nothing.
    pub fn write(&self, number: &str, records: &[Record]) -> Result<Writes> {
        self.db.write_batch(&self.accounts, number, records)
    }

    /// Stored records of account `number` (all accounts if empty) within the
    /// given bounds, newest first
    pub fn read(
        &self,
        number: &str,
        since: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<Record>> {
        self.db.select_records_between(Some(number), since, until)
    }

    pub fn assort(&self, records: Vec<Record>) -> Vec<Group> {
        self.classifier.assort(records)
    }

    pub fn assort_period<F>(&self, records: Vec<Record>, key: F) -> Vec<Period>
    where
        F: Fn(NaiveDate) -> NaiveDate,
    {
        self.classifier.assort_period(records, key)
    }

    /// Stored accounts with their record counts
    pub fn accounts(&self) -> Result<Vec<AccountSummary>> {
        self.db.list_accounts()
    }

    /// Format minor units as `units<comma>cents`, e.g. `-15` as `-0.15`
    pub fn format_amount(&self, n: i64) -> String {
        format_amount(n, &self.comma)
    }

    /// Write one CSV row per group of each period: the period formatted with
    /// the chrono `layout`, the group name and its formatted sum
    pub fn export<W: Write>(&self, writer: W, periods: &[Period], layout: &str) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for period in periods {
            let time = period.time.format(layout).to_string();
            for group in &period.groups {
                wtr.write_record([
                    time.as_str(),
                    group.name.as_str(),
                    self.format_amount(group.sum()).as_str(),
                ])?;
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Format minor units with the given decimal separator.
///
/// Values between -1 and 0 units keep their sign: `-15` is `-0<comma>15`.
pub fn format_amount(n: i64, comma: &str) -> String {
    let units = n / 100;
    let cents = (n % 100).abs();
    let sign = if n < 0 && units == 0 { "-" } else { "" };
    format!("{}{}{}{:02}", sign, units, comma, cents)
}
