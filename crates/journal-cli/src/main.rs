//! Journal CLI - Bank record budgeting
//!
//! Usage:
//!   journal import ACCOUNT FILE...   Import bank exports into an account
//!   journal ls --month 3             Budget table for March
//!   journal ls --explain             One row per record
//!   journal export --period year     Group sums per year as CSV

mod cli;
mod commands;


use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let journal = commands::open_journal(&cli.config)?;
    let clock = commands::Clock::system();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Import {
            account,
            files,
            reader,
        } => commands::cmd_import(&journal, &account, &files, &reader).map(|_| ()),
        Commands::Export {
            account,
            since,
            until,
            period,
        } => {
            let range = clock.time_range(since.as_deref(), until.as_deref())?;
            commands::cmd_export(&journal, &mut out, account.as_deref(), &range, period)
        }
        Commands::Ls {
            account,
            since,
            until,
            month,
            explain,
            order_by,
            hide_group,
        } => {
            let range = clock.resolve(since.as_deref(), until.as_deref(), month)?;
            let color = match cli.color {
                ColorMode::Always => true,
                ColorMode::Never => false,
                ColorMode::Auto => std::io::stdout().is_terminal(),
            };
            let opts = commands::ListOptions {
                account,
                range,
                explain,
                order_by: order_by.into(),
                hide_groups: hide_group,
                color,
            };
            commands::cmd_ls(&journal, &mut out, &opts)
        }
        Commands::Accounts => commands::cmd_accounts(&journal, &mut out),
    }
}
