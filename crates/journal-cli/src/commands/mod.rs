//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `accounts` - Configured accounts and their record counts
//! - `export` - Periodic CSV export of group sums
//! - `import` - Bank export import
//! - `list` - Grouped budget table and per-record explanation (`ls`)
//! - `sgr` - Terminal colors and the balance bar
//! - `table` - Plain text table rendering
//! - `time` - Date range resolution for `--since`/`--until`/`--month`

pub mod accounts;
pub mod export;
pub mod import;
pub mod list;
pub mod sgr;
pub mod table;
pub mod time;

use anyhow::{Context, Result};
use journal_core::Journal;

// Re-export command functions for main.rs
pub use accounts::*;
pub use export::*;
pub use import::*;
pub use list::*;
pub use time::Clock;

/// Load the configuration and open the journal it points at
pub fn open_journal(config_path: &str) -> Result<Journal> {
    Journal::from_file(config_path)
        .with_context(|| format!("Failed to open journal from config {}", config_path))
}

/// Truncate a string to max length with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
