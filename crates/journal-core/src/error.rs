//! Error types for journal

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("workbook has no sheets")]
    EmptyWorkbook,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid {field}: {value:?}")]
    InvalidConfig { field: &'static str, value: String },

    #[error("duplicate group: {0:?}")]
    DuplicateGroup(String),

    #[error("group {group:?}: invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        group: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid account: {0}")]
    UnknownAccount(String),

    #[error("invalid {field} on line {line}: {value:?}")]
    Parse {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("invalid reader: {0:?}")]
    UnknownReader(String),
}

impl Error {
    pub(crate) fn invalid_config(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            value: value.into(),
        }
    }

    pub(crate) fn parse(line: usize, field: &'static str, value: impl Into<String>) -> Self {
        Self::Parse {
            line,
            field,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
