//! Journal Core Library
//!
//! Shared functionality for the journal bank record tool:
//! - Record store with idempotent imports
//! - Import readers for various bank export formats
//! - Rule-based classification of records into budget groups
//! - Budget and balance computation over date ranges
//! - TOML configuration

pub mod budget;
pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod journal;
pub mod models;

pub use budget::{max_balance, min_balance, Budget, Group};
pub use classify::{sort_groups, sort_records, Classifier, Period, Rule, SortField};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use import::{reader_for, RecordReader};
pub use journal::{format_amount, Journal};
pub use models::{Account, AccountSummary, DateRange, Record, Writes};
