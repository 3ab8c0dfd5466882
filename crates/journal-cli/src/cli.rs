//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand, ValueEnum};
use journal_core::config::DEFAULT_CONFIG_PATH;
use journal_core::import::READER_NAMES;
use journal_core::SortField;

/// Journal - Import, classify and budget bank records
#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Import bank records and compare spending against budgets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file
    #[arg(short = 'f', long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// When to color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportPeriod {
    Month,
    Year,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OrderBy {
    Sum,
    Date,
    Name,
    Group,
}

impl From<OrderBy> for SortField {
    fn from(order: OrderBy) -> Self {
        match order {
            OrderBy::Sum => SortField::Sum,
            OrderBy::Date => SortField::Time,
            OrderBy::Name => SortField::Name,
            OrderBy::Group => SortField::Group,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import records from bank exports
    Import {
        /// Account number the records belong to
        account: String,

        /// Export files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Export format (picked by file extension when auto)
        #[arg(short, long, default_value = "auto", value_parser = PossibleValuesParser::new(READER_NAMES.iter().copied()))]
        reader: String,
    },

    /// Export group sums per period as CSV
    Export {
        /// Only records of this account
        account: Option<String>,

        /// First date (YYYY-MM-DD), defaults to the start of this month
        #[arg(short, long)]
        since: Option<String>,

        /// Last date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        until: Option<String>,

        /// Period to sum over
        #[arg(short, long, value_enum, default_value_t = ExportPeriod::Month)]
        period: ExportPeriod,
    },

    /// List groups with budgets and balances
    Ls {
        /// Only records of this account
        account: Option<String>,

        /// First date (YYYY-MM-DD), defaults to the start of this month
        #[arg(short, long)]
        since: Option<String>,

        /// Last date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        until: Option<String>,

        /// Show the most recent month with this number (1-12)
        #[arg(short, long)]
        month: Option<u32>,

        /// List individual records
        #[arg(short, long)]
        explain: bool,

        /// Sort order
        #[arg(short, long, value_enum, default_value_t = OrderBy::Sum)]
        order_by: OrderBy,

        /// Leave out this group (repeatable)
        #[arg(long = "hide-group", value_name = "NAME")]
        hide_group: Vec<String>,
    },

    /// Show configured accounts and their stored record counts
    Accounts,
}
