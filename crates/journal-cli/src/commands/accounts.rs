//! `accounts` command

use std::io::Write;

use anyhow::Result;
use journal_core::Journal;

/// List configured accounts with the number of records stored for each
pub fn cmd_accounts<W: Write>(journal: &Journal, out: &mut W) -> Result<()> {
    let stored = journal.accounts()?;
    let configured = journal.configured_accounts();

    if configured.is_empty() {
        writeln!(out, "No accounts configured.")?;
        return Ok(());
    }

    writeln!(out, "🏦 Accounts ({}):", configured.len())?;
    writeln!(out)?;
    let width = configured.iter().map(|a| a.number.len()).max().unwrap_or(0);
    for account in configured {
        let records = stored
            .iter()
            .find(|s| s.account.number == account.number)
            .map(|s| s.records)
            .unwrap_or(0);
        writeln!(
            out,
            "   {:<width$} │ {:>8} │ {}",
            account.number,
            records,
            account.name,
            width = width
        )?;
    }
    Ok(())
}
