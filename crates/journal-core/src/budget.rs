//! Budget model: monthly allotments amortised over a query range

use std::hash::{Hash, Hasher};

use chrono::Datelike;
use serde::Serialize;

use crate::models::{DateRange, Record};

/// Monthly allotment for a group
///
/// When any entry of `months` is non-zero the per-month values apply and
/// `default` is ignored. Otherwise every month uses `default`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Budget {
    pub default: i64,
    pub months: [i64; 12],
}

impl Budget {
    pub fn flat(default: i64) -> Self {
        Self {
            default,
            months: [0; 12],
        }
    }

    pub fn monthly(months: [i64; 12]) -> Self {
        Self { default: 0, months }
    }

    fn has_overrides(&self) -> bool {
        self.months.iter().any(|m| *m != 0)
    }

    /// Allotment for calendar month `month` (1-12)
    pub fn month(&self, month: u32) -> i64 {
        if !self.has_overrides() {
            return self.default;
        }
        match month {
            1..=12 => self.months[month as usize - 1],
            _ => 0,
        }
    }

    /// Sum of the allotments for every month touched by `range`
    pub fn for_range(&self, range: &DateRange) -> i64 {
        range.months().iter().map(|m| self.month(m.month())).sum()
    }
}

/// Records assigned to one rule, plus that rule's budget
///
/// Groups compare and hash by name only.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub name: String,
    pub records: Vec<Record>,
    pub budget: Budget,
    /// Tolerated balance per month, see [`Group::is_balanced`]
    pub slack: i64,
}

impl Group {
    pub fn new(name: impl Into<String>, budget: Budget) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
            budget,
            slack: 0,
        }
    }

    pub fn with_slack(mut self, slack: i64) -> Self {
        self.slack = slack;
        self
    }

    pub fn sum(&self) -> i64 {
        self.records.iter().map(|r| r.amount).sum()
    }

    pub fn budget(&self, range: &DateRange) -> i64 {
        self.budget.for_range(range)
    }

    /// Budget minus sum. Zero is exact break-even.
    pub fn balance(&self, range: &DateRange) -> i64 {
        self.budget(range) - self.sum()
    }

    pub fn slack(&self, range: &DateRange) -> i64 {
        Budget::flat(self.slack).for_range(range)
    }

    /// Whether the balance lies between zero and the (signed) slack.
    pub fn is_balanced(&self, range: &DateRange) -> bool {
        let balance = self.balance(range);
        let slack = self.slack(range);
        if slack >= 0 {
            (0..=slack).contains(&balance)
        } else {
            (slack..=0).contains(&balance)
        }
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Group {}

impl Hash for Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Largest group balance over `range`, never below zero
pub fn max_balance(groups: &[Group], range: &DateRange) -> i64 {
    groups
        .iter()
        .map(|g| g.balance(range))
        .fold(0, i64::max)
}

/// Smallest group balance over `range`, never above zero
pub fn min_balance(groups: &[Group], range: &DateRange) -> i64 {
    groups
        .iter()
        .map(|g| g.balance(range))
        .fold(0, i64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn range(since: NaiveDate, until: NaiveDate) -> DateRange {
        DateRange::new(since, until)
    }

    fn group_with(budget: Budget, amounts: &[i64]) -> Group {
        let mut group = Group::new("A", budget);
        for amount in amounts {
            group.records.push(Record::new(date(2017, 1, 1), "", *amount));
        }
        group
    }

    fn months(values: &[i64]) -> [i64; 12] {
        let mut months = [0; 12];
        months[..values.len()].copy_from_slice(values);
        months
    }

    #[test]
    fn test_budget_month_override() {
        let flat = Budget::flat(250);
        assert_eq!(flat.month(1), 250);
        assert_eq!(flat.month(12), 250);

        // A single non-zero month disables the default everywhere
        let seasonal = Budget {
            default: 250,
            months: months(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1000]),
        };
        assert_eq!(seasonal.month(1), 0);
        assert_eq!(seasonal.month(12), 1000);
    }

    #[test]
    fn test_group_balance() {
        let group = group_with(Budget::monthly(months(&[500])), &[50, 200, 1000]);
        let r = range(date(2017, 1, 1), date(2017, 2, 1));
        assert_eq!(group.sum(), 1250);
        assert_eq!(group.budget(&r), 500);
        assert_eq!(group.balance(&r), -750);
    }

    #[test]
    fn test_group_balance_negative_budget() {
        let group = group_with(Budget::monthly(months(&[-500, -500, -500])), &[-500]);
        let r = range(date(2017, 1, 1), date(2017, 3, 1));
        assert_eq!(group.budget(&r), -1500);
        assert_eq!(group.sum(), -500);
        assert_eq!(group.balance(&r), -1000);
    }

    #[test]
    fn test_group_balance_break_even() {
        let group = group_with(Budget::monthly(months(&[500])), &[500]);
        let r = range(date(2017, 1, 1), date(2017, 9, 1));
        assert_eq!(group.budget(&r), 500);
        assert_eq!(group.balance(&r), 0);
    }

    #[test]
    fn test_group_budget_default() {
        let group = group_with(Budget::flat(250), &[]);
        let r = range(date(2017, 1, 1), date(2017, 3, 1));
        assert_eq!(group.budget(&r), 750);
    }

    #[test]
    fn test_budget_amortized_per_month_not_per_record() {
        let many = group_with(Budget::flat(100), &[1, 2, 3, 4, 5]);
        let none = group_with(Budget::flat(100), &[]);
        let r = range(date(2017, 5, 20), date(2017, 7, 3));
        assert_eq!(many.budget(&r), 300);
        assert_eq!(none.budget(&r), 300);
    }

    #[test]
    fn test_max_min_balance() {
        let r = range(date(2017, 1, 1), date(2017, 1, 31));
        let negative: Vec<Group> = [-6000, -8000, -7000]
            .iter()
            .map(|a| group_with(Budget::default(), &[*a]))
            .collect();
        assert_eq!(max_balance(&negative, &r), 8000);
        assert_eq!(min_balance(&negative, &r), 0);

        let positive: Vec<Group> = [6000, 8000, 7000]
            .iter()
            .map(|a| group_with(Budget::default(), &[*a]))
            .collect();
        assert_eq!(min_balance(&positive, &r), -8000);
        assert_eq!(max_balance(&positive, &r), 0);

        assert_eq!(max_balance(&[], &r), 0);
        assert_eq!(min_balance(&[], &r), 0);
    }

    #[test]
    fn test_slack() {
        let r = range(date(2017, 1, 1), date(2017, 2, 28));

        // budget -2000 over two months, spent -1800: balance -200
        let group = group_with(Budget::flat(-1000), &[-1800]).with_slack(-150);
        assert_eq!(group.slack(&r), -300);
        assert_eq!(group.balance(&r), -200);
        assert!(group.is_balanced(&r));

        let tight = group_with(Budget::flat(-1000), &[-1800]).with_slack(-50);
        assert!(!tight.is_balanced(&r));

        let exact = group_with(Budget::flat(-1000), &[-2000]);
        assert!(exact.is_balanced(&r));

        // Positive slack tolerates positive balances only
        let income = group_with(Budget::flat(1000), &[1900]).with_slack(100);
        assert_eq!(income.balance(&r), 100);
        assert!(income.is_balanced(&r));
        let over = group_with(Budget::flat(1000), &[2100]).with_slack(100);
        assert!(!over.is_balanced(&r));
    }

    #[test]
    fn test_group_equality_by_name() {
        let a = group_with(Budget::flat(1), &[1]);
        let b = group_with(Budget::flat(2), &[]);
        assert_eq!(a, b);
        assert_ne!(a, Group::new("B", Budget::flat(1)));
    }
}
