//! Import command implementation

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use journal_core::{reader_for, Journal, Writes};
use tracing::{debug, info};

/// Import every file in `files` into account `account`.
///
/// Each file is written in its own transaction, so a bad file does not undo
/// the files before it.
pub fn cmd_import(
    journal: &Journal,
    account: &str,
    files: &[PathBuf],
    reader: &str,
) -> Result<Writes> {
    let mut total = Writes::default();
    let mut read = 0;

    for file in files {
        let input =
            File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
        let records = reader_for(reader, file, input)?
            .read()
            .with_context(|| format!("Failed to read {}", file.display()))?;
        debug!("Read {} record(s) from {}", records.len(), file.display());
        read += records.len();

        let writes = journal
            .write(account, &records)
            .with_context(|| format!("Failed to import {}", file.display()))?;
        total.accounts += writes.accounts;
        total.records += writes.records;
    }

    info!("created {} new account(s)", total.accounts);
    info!("imported {} new record(s) out of {} total", total.records, read);
    Ok(total)
}
