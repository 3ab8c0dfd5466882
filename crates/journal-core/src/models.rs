//! Data models for journal

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Number of hex characters kept from a record fingerprint
pub const ID_LEN: usize = 10;

/// Date layout used for fingerprints, storage and display
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A financial account, identified by its account number
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub number: String,
    pub name: String,
}

impl Account {
    pub fn new(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
        }
    }
}

/// A single financial transaction
///
/// Amounts and balances are in minor currency units (e.g. cents). Records
/// produced by format adapters carry an empty account until they are written
/// to a journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub account: Account,
    pub time: NaiveDate,
    pub text: String,
    pub amount: i64,
    /// Running balance reported by the bank, if any
    pub balance: Option<i64>,
}

impl Record {
    pub fn new(time: NaiveDate, text: impl Into<String>, amount: i64) -> Self {
        Self {
            account: Account::default(),
            time,
            text: text.into(),
            amount,
            balance: None,
        }
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.account = account;
        self
    }

    pub fn with_balance(mut self, balance: i64) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Short fingerprint of this record's identity fields.
    ///
    /// Derived from the account number, the calendar date, the text, the
    /// amount and the balance when it is non-zero. A zero balance is treated
    /// the same as a missing one.
    pub fn id(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update(self.account.number.as_bytes());
        hasher.update(self.time.format(DATE_FORMAT).to_string().as_bytes());
        hasher.update(self.text.as_bytes());
        hasher.update(self.amount.to_string().as_bytes());
        if let Some(balance) = self.balance.filter(|b| *b != 0) {
            hasher.update(balance.to_string().as_bytes());
        }
        let mut id = hex::encode(hasher.finalize());
        id.truncate(ID_LEN);
        id
    }
}

/// Stored account with the number of records written for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub account: Account,
    pub records: i64,
}

/// Counts of rows newly written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Writes {
    pub accounts: usize,
    pub records: usize,
}

/// Inclusive date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl DateRange {
    pub fn new(since: NaiveDate, until: NaiveDate) -> Self {
        Self { since, until }
    }

    /// First day of every calendar month touched by this range, oldest first.
    ///
    /// A range inside a single month yields exactly that month. An inverted
    /// range yields nothing.
    pub fn months(&self) -> Vec<NaiveDate> {
        let mut months = Vec::new();
        let last = month_start(self.until);
        let mut month = month_start(self.since);
        while month <= last {
            months.push(month);
            match month.checked_add_months(Months::new(1)) {
                Some(next) => month = next,
                None => break,
            }
        }
        months
    }
}

/// Truncate a date to the first day of its month
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Truncate a date to the first day of its year
pub fn year_start(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn record(number: &str, time: NaiveDate, text: &str, amount: i64) -> Record {
        Record::new(time, text, amount).with_account(Account::new(number, ""))
    }

    #[test]
    fn test_record_id() {
        let cases = [
            (record("1.2.3", date(2017, 1, 1), "Transaction 1", 42), "f4fb9cb746"),
            (record("1.2.4", date(2018, 1, 1), "Transaction 2", 42), "2c07328f92"),
            (
                record("1.2.4", date(2018, 1, 1), "Transaction 2", 42).with_balance(1337),
                "a56d3a1128",
            ),
        ];
        for (record, want) in cases {
            assert_eq!(record.id(), want);
            assert_eq!(record.id().len(), ID_LEN);
        }
    }

    #[test]
    fn test_record_id_changes_with_identity_fields() {
        let base = record("1.2.3", date(2017, 1, 1), "Transaction 1", 42);
        let id = base.id();

        let mut other = base.clone();
        other.text = "Transaction 2".to_string();
        assert_ne!(other.id(), id);

        let mut other = base.clone();
        other.amount = 43;
        assert_ne!(other.id(), id);

        let mut other = base.clone();
        other.time = date(2017, 1, 2);
        assert_ne!(other.id(), id);

        assert_ne!(base.clone().with_balance(100).id(), id);
    }

    #[test]
    fn test_record_id_zero_balance_is_absent() {
        let base = record("1.2.3", date(2017, 1, 1), "Transaction 1", 42);
        assert_eq!(base.clone().with_balance(0).id(), base.id());
    }

    #[test]
    fn test_range_months() {
        let single = DateRange::new(date(2017, 1, 10), date(2017, 1, 20));
        assert_eq!(single.months(), vec![date(2017, 1, 1)]);

        let across_year = DateRange::new(date(2017, 11, 30), date(2018, 1, 2));
        assert_eq!(
            across_year.months(),
            vec![date(2017, 11, 1), date(2017, 12, 1), date(2018, 1, 1)]
        );

        // Day of month does not matter, only which months are touched
        let partial = DateRange::new(date(2017, 1, 31), date(2017, 2, 1));
        assert_eq!(partial.months().len(), 2);

        let inverted = DateRange::new(date(2017, 3, 1), date(2017, 1, 1));
        assert!(inverted.months().is_empty());
    }

    #[test]
    fn test_period_keys() {
        assert_eq!(month_start(date(2017, 3, 30)), date(2017, 3, 1));
        assert_eq!(year_start(date(2017, 3, 30)), date(2017, 1, 1));
    }
}
