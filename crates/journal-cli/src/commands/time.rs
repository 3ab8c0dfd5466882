//! Date range resolution for command line arguments

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, Months, NaiveDate};
use journal_core::models::{month_start, DATE_FORMAT};
use journal_core::DateRange;

/// Source of "today" for default ranges
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    today: NaiveDate,
}

impl Clock {
    /// The local calendar date
    pub fn system() -> Self {
        Self::at(Local::now().date_naive())
    }

    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Range from `--since`/`--until`: a missing start is the first of the
    /// current month, a missing end is today
    pub fn time_range(&self, since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
        let since = match parse_date(since)? {
            Some(date) => date,
            None => month_start(self.today),
        };
        let until = parse_date(until)?.unwrap_or(self.today);
        Ok(DateRange::new(since, until))
    }

    /// The whole of the latest month numbered `month` that is not in the
    /// future
    pub fn month_range(&self, month: u32) -> Result<DateRange> {
        if !(1..=12).contains(&month) {
            bail!("invalid month: {}", month);
        }
        let year = if month > self.today.month() {
            self.today.year() - 1
        } else {
            self.today.year()
        };
        let since = NaiveDate::from_ymd_opt(year, month, 1)
            .with_context(|| format!("invalid month: {}", month))?;
        let until = since
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .with_context(|| format!("invalid month: {}", month))?;
        Ok(DateRange::new(since, until))
    }

    /// Range from the `ls` arguments, where `--month` excludes the others
    pub fn resolve(
        &self,
        since: Option<&str>,
        until: Option<&str>,
        month: Option<u32>,
    ) -> Result<DateRange> {
        match month {
            Some(_) if since.is_some() || until.is_some() => {
                bail!("--month cannot be combined with --since or --until")
            }
            Some(month) => self.month_range(month),
            None => self.time_range(since, until),
        }
    }
}

/// Parse an optional `YYYY-MM-DD` argument; empty counts as absent
pub fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .with_context(|| format!("invalid date: {:?}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_month_range() {
        let clock = Clock::at(date(2019, 1, 1));

        let range = clock.month_range(10).unwrap();
        assert_eq!(range, DateRange::new(date(2018, 10, 1), date(2018, 10, 31)));

        let range = clock.month_range(1).unwrap();
        assert_eq!(range, DateRange::new(date(2019, 1, 1), date(2019, 1, 31)));

        let range = Clock::at(date(2020, 3, 15)).month_range(2).unwrap();
        assert_eq!(range.until, date(2020, 2, 29));

        for month in [0, 13] {
            let err = clock.month_range(month).unwrap_err();
            assert_eq!(err.to_string(), format!("invalid month: {}", month));
        }
    }

    #[test]
    fn test_time_range_defaults() {
        let clock = Clock::at(date(2018, 5, 17));
        let range = clock.time_range(None, None).unwrap();
        assert_eq!(range, DateRange::new(date(2018, 5, 1), date(2018, 5, 17)));

        let range = clock.time_range(Some("2018-01-01"), Some("")).unwrap();
        assert_eq!(range, DateRange::new(date(2018, 1, 1), date(2018, 5, 17)));

        assert!(clock.time_range(Some("01.01.2018"), None).is_err());
    }

    #[test]
    fn test_resolve() {
        let clock = Clock::at(date(2018, 5, 17));
        let err = clock.resolve(Some("2018-01-01"), None, Some(3)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "--month cannot be combined with --since or --until"
        );

        let range = clock.resolve(None, None, Some(3)).unwrap();
        assert_eq!(range, DateRange::new(date(2018, 3, 1), date(2018, 3, 31)));
    }
}
