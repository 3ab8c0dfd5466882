//! Record store with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `accounts` - Account registration and summaries
//! - `records` - Deduplicating record writes and range queries
//!
//! All access goes through a process-wide read/write lock: writes hold it
//! exclusively, reads share it. Every write call runs in a single SQLite
//! transaction.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::debug;

use crate::config::MEMORY_DATABASE;
use crate::error::{Error, Result};
use crate::models::DATE_FORMAT;

mod accounts;
mod records;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a stored `YYYY-MM-DD` date, reporting failures as a column error
pub(crate) fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn enable_foreign_keys(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    lock: Arc<RwLock<()>>,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (creating if needed) the store at `path`
    ///
    /// The path `:memory:` opens a private in-memory store instead.
    pub fn new(path: &str) -> Result<Self> {
        if path == MEMORY_DATABASE {
            return Self::in_memory();
        }
        let manager = SqliteConnectionManager::file(path).with_init(enable_foreign_keys);
        let pool = Pool::builder().max_size(10).build(manager)?;
        Self::with_pool(pool, path)
    }

    /// Create an in-memory database
    ///
    /// Each SQLite in-memory connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(enable_foreign_keys);
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;
        Self::with_pool(pool, MEMORY_DATABASE)
    }

    fn with_pool(pool: DbPool, path: &str) -> Result<Self> {
        let db = Self {
            pool,
            lock: Arc::new(RwLock::new(())),
            db_path: path.to_string(),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Get a connection from the pool
    ///
    /// Callers going around the store API should hold [`Database::read_lock`]
    /// or [`Database::write_lock`] first.
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    pub(crate) fn read_lock(&self) -> Result<RwLockReadGuard<'_, ()>> {
        self.lock.read().map_err(|_| Error::LockPoisoned)
    }

    pub(crate) fn write_lock(&self) -> Result<RwLockWriteGuard<'_, ()>> {
        self.lock.write().map_err(|_| Error::LockPoisoned)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let _guard = self.write_lock()?;
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;

            -- Synchronous NORMAL: safe for most power-loss scenarios in WAL mode
            PRAGMA synchronous = NORMAL;

            PRAGMA temp_store = MEMORY;

            -- Accounts, keyed by their bank account number
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY,
                number TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Records. The natural key below is what makes imports idempotent;
            -- the running balance is not part of it.
            CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY,
                account_id INTEGER NOT NULL REFERENCES accounts(id),
                time DATE NOT NULL,
                text TEXT NOT NULL,
                amount INTEGER NOT NULL,
                -- Running balance as exported, 0 when absent
                balance INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (account_id, time, text, amount)
            );

            CREATE INDEX IF NOT EXISTS idx_records_time ON records(time);
            "#,
        )?;

        debug!("Database schema initialized");
        Ok(())
    }
}
