//! `ls` command: budget table per group, or one row per record

use std::io::Write;

use anyhow::{bail, Result};
use journal_core::models::DATE_FORMAT;
use journal_core::{
    max_balance, min_balance, sort_groups, sort_records, DateRange, Group, Journal, SortField,
};
use tracing::info;

use super::sgr::Sgr;
use super::table::{Align, Table};
use super::truncate;

/// Longest record text shown in explain mode
const MAX_TEXT: usize = 50;

pub struct ListOptions {
    pub account: Option<String>,
    pub range: DateRange,
    pub explain: bool,
    pub order_by: SortField,
    pub hide_groups: Vec<String>,
    pub color: bool,
}

pub fn cmd_ls<W: Write>(journal: &Journal, out: &mut W, opts: &ListOptions) -> Result<()> {
    if opts.order_by == SortField::Time && !opts.explain {
        bail!("grouped output cannot be ordered by date");
    }

    let range = &opts.range;
    info!(
        "displaying records between {} and {}",
        range.since.format(DATE_FORMAT),
        range.until.format(DATE_FORMAT)
    );

    let records = journal.read(
        opts.account.as_deref().unwrap_or(""),
        Some(range.since),
        Some(range.until),
    )?;
    let mut groups = journal.assort(records);
    groups.retain(|g| !opts.hide_groups.contains(&g.name));
    sort_groups(&mut groups, opts.order_by);
    for group in &mut groups {
        sort_records(&mut group.records, opts.order_by);
    }

    if opts.explain {
        write_records(journal, out, &groups, opts.order_by)
    } else {
        write_groups(journal, out, &groups, range, opts.color)
    }
}

fn write_groups<W: Write>(
    journal: &Journal,
    out: &mut W,
    groups: &[Group],
    range: &DateRange,
    color: bool,
) -> Result<()> {
    let sgr = Sgr::new(min_balance(groups, range), max_balance(groups, range), color);
    let mut table = Table::new(&[
        ("Group", Align::Left),
        ("Records", Align::Right),
        ("Sum", Align::Right),
        ("Budget", Align::Right),
        ("Slack", Align::Right),
        ("Balance", Align::Right),
        ("Balance bar", Align::Left),
    ]);

    let (mut records, mut sum, mut budget, mut slack, mut balance) = (0, 0, 0, 0, 0);
    for group in groups {
        let group_balance = group.balance(range);
        table.push(vec![
            group.name.clone(),
            group.records.len().to_string(),
            journal.format_amount(group.sum()),
            journal.format_amount(group.budget(range)),
            journal.format_amount(group.slack(range)),
            sgr.paint(
                &journal.format_amount(group_balance),
                group_balance,
                group.is_balanced(range),
            ),
            sgr.bar(group_balance),
        ]);
        records += group.records.len();
        sum += group.sum();
        budget += group.budget(range);
        slack += group.slack(range);
        balance += group_balance;
    }
    table.set_footer(vec![
        "Total".to_string(),
        records.to_string(),
        journal.format_amount(sum),
        journal.format_amount(budget),
        journal.format_amount(slack),
        journal.format_amount(balance),
        String::new(),
    ]);

    table.render(out)?;
    Ok(())
}

fn write_records<W: Write>(
    journal: &Journal,
    out: &mut W,
    groups: &[Group],
    order_by: SortField,
) -> Result<()> {
    let mut rows: Vec<_> = groups
        .iter()
        .flat_map(|g| g.records.iter().map(move |r| (g.name.as_str(), r)))
        .collect();
    // Dates order across groups, not within them
    if order_by == SortField::Time {
        rows.sort_by(|a, b| b.1.time.cmp(&a.1.time));
    }

    let mut table = Table::new(&[
        ("Account", Align::Left),
        ("Account name", Align::Left),
        ("ID", Align::Left),
        ("Date", Align::Left),
        ("Group", Align::Left),
        ("Text", Align::Left),
        ("Amount", Align::Right),
        ("Total", Align::Right),
    ]);
    let mut total = 0;
    for (group, record) in rows {
        total += record.amount;
        table.push(vec![
            record.account.number.clone(),
            record.account.name.clone(),
            record.id(),
            record.time.format(DATE_FORMAT).to_string(),
            group.to_string(),
            truncate(&record.text, MAX_TEXT),
            journal.format_amount(record.amount),
            journal.format_amount(total),
        ]);
    }
    table.set_footer(vec![
        "Total".to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        journal.format_amount(total),
        String::new(),
    ]);

    table.render(out)?;
    Ok(())
}
