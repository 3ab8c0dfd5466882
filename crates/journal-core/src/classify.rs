//! Rule-based classification of records into groups
//!
//! Rules are tried in configuration order, in two passes: pinned record IDs
//! first, then text patterns. The first matching rule decides the group, or
//! drops the record if the rule discards. Records no rule claims fall into
//! the default group.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::budget::{Budget, Group};
use crate::models::Record;

/// A configured matcher assigning records to a named group
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    /// Only records of this account number are considered
    pub account: Option<String>,
    pub ids: HashSet<String>,
    pub patterns: Vec<Regex>,
    pub budget: Budget,
    pub slack: i64,
    pub discard: bool,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account: None,
            ids: HashSet::new(),
            patterns: Vec::new(),
            budget: Budget::default(),
            slack: 0,
            discard: false,
        }
    }

    fn applies_to(&self, record: &Record) -> bool {
        match self.account.as_deref() {
            None | Some("") => true,
            Some(number) => number == record.account.number,
        }
    }

    fn matches_text(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    fn group(&self) -> Group {
        Group::new(self.name.clone(), self.budget).with_slack(self.slack)
    }
}

/// Ordered rule set plus the name of the catch-all group
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    default_group: String,
}

impl Classifier {
    pub fn new(rules: Vec<Rule>, default_group: impl Into<String>) -> Self {
        Self {
            rules,
            default_group: default_group.into(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn default_group(&self) -> &str {
        &self.default_group
    }

    /// First rule claiming `record`, by pinned ID before any pattern.
    ///
    /// The result borrows only from the classifier, not from `record`.
    pub fn find_rule(&self, record: &Record) -> Option<&Rule> {
        let id = record.id();
        let mut applicable = self.rules.iter().filter(|r| r.applies_to(record));
        applicable
            .clone()
            .find(|r| r.ids.contains(&id))
            .or_else(|| applicable.find(|r| r.matches_text(&record.text)))
    }

    /// Empty group `record` belongs to, or `None` when it is discarded
    pub fn classify(&self, record: &Record) -> Option<Group> {
        match self.find_rule(record) {
            Some(rule) if rule.discard => None,
            Some(rule) => Some(rule.group()),
            None => Some(Group::new(self.default_group.clone(), Budget::default())),
        }
    }

    /// Classify every record, returning groups ordered by name
    pub fn assort(&self, records: impl IntoIterator<Item = Record>) -> Vec<Group> {
        assort_by(records, |r| self.classify(r))
    }

    /// Bucket records by `key` and assort each bucket, newest bucket first
    pub fn assort_period<F>(&self, records: impl IntoIterator<Item = Record>, key: F) -> Vec<Period>
    where
        F: Fn(NaiveDate) -> NaiveDate,
    {
        assort_period_by(records, key, |bucket| self.assort(bucket))
    }
}

/// Group records using `group_of`, dropping those it maps to `None`.
///
/// Groups come back sorted by name; records keep their input order within a
/// group.
pub fn assort_by<F>(records: impl IntoIterator<Item = Record>, mut group_of: F) -> Vec<Group>
where
    F: FnMut(&Record) -> Option<Group>,
{
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    let mut discarded = 0usize;
    for record in records {
        match group_of(&record) {
            Some(group) => groups
                .entry(group.name.clone())
                .or_insert(group)
                .records
                .push(record),
            None => discarded += 1,
        }
    }
    if discarded > 0 {
        debug!("Discarded {} record(s)", discarded);
    }
    groups.into_values().collect()
}

/// Records of one calendar bucket, classified independently
#[derive(Debug, Clone, Serialize)]
pub struct Period {
    pub time: NaiveDate,
    pub groups: Vec<Group>,
}

pub fn assort_period_by<K, A>(
    records: impl IntoIterator<Item = Record>,
    key: K,
    mut assort: A,
) -> Vec<Period>
where
    K: Fn(NaiveDate) -> NaiveDate,
    A: FnMut(Vec<Record>) -> Vec<Group>,
{
    let mut buckets: BTreeMap<Reverse<NaiveDate>, Vec<Record>> = BTreeMap::new();
    for record in records {
        buckets.entry(Reverse(key(record.time))).or_default().push(record);
    }
    buckets
        .into_iter()
        .map(|(Reverse(time), records)| Period {
            time,
            groups: assort(records),
        })
        .collect()
}

/// Field to order listings by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Group,
    Name,
    #[default]
    Sum,
    Time,
}

/// Order records: text for `Name`, newest first for `Time`, amount otherwise
pub fn sort_records(records: &mut [Record], field: SortField) {
    match field {
        SortField::Name => records.sort_by(|a, b| a.text.cmp(&b.text)),
        SortField::Time => records.sort_by(|a, b| b.time.cmp(&a.time)),
        SortField::Group | SortField::Sum => records.sort_by_key(|r| r.amount),
    }
}

/// Order groups by sum for `Sum`, by name otherwise
pub fn sort_groups(groups: &mut [Group], field: SortField) {
    match field {
        SortField::Sum => groups.sort_by_key(|g| g.sum()),
        _ => groups.sort_by(|a, b| a.name.cmp(&b.name)),
    }
}
