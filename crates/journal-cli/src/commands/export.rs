//! `export` command: group sums per period as CSV

use std::io::Write;

use anyhow::Result;
use journal_core::models::{month_start, year_start};
use journal_core::{DateRange, Journal};
use tracing::debug;

use crate::cli::ExportPeriod;

/// Write one `period,group,sum` row per group and period, newest period first
pub fn cmd_export<W: Write>(
    journal: &Journal,
    out: &mut W,
    account: Option<&str>,
    range: &DateRange,
    period: ExportPeriod,
) -> Result<()> {
    let records = journal.read(
        account.unwrap_or(""),
        Some(range.since),
        Some(range.until),
    )?;
    debug!("Exporting {} record(s)", records.len());

    let (periods, layout) = match period {
        ExportPeriod::Month => (journal.assort_period(records, month_start), "%Y-%m"),
        ExportPeriod::Year => (journal.assort_period(records, year_start), "%Y"),
    };
    journal.export(out, &periods, layout)?;
    Ok(())
}
