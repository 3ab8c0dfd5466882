//! Journal configuration
//!
//! Configuration is a TOML file (by default `~/.journalrc`):
//!
//! ```toml
//! database = "~/.journal.db"
//! comma = ","
//! default_group = "*** UNMATCHED ***"
//!
//! [[accounts]]
//! number = "1234.56.78900"
//! name = "Checking"
//!
//! [[groups]]
//! name = "Groceries"
//! budget = -400000
//! patterns = ["^Rema", "^Kiwi"]
//! ```
//!
//! Parsing validates everything up front and compiles group patterns once,
//! so a loaded [`Config`] is immutable and cannot fail later.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::budget::Budget;
use crate::classify::{Classifier, Rule};
use crate::error::{Error, Result};
use crate::models::Account;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "~/.journalrc";

/// Database path selecting a private in-memory store
pub const MEMORY_DATABASE: &str = ":memory:";

pub const DEFAULT_COMMA: &str = ".";
pub const DEFAULT_GROUP: &str = "*** UNMATCHED ***";

/// Validated journal configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Store location with `~` expanded, or [`MEMORY_DATABASE`]
    pub database: String,
    /// Decimal separator used when formatting amounts
    pub comma: String,
    pub accounts: Vec<Account>,
    pub classifier: Classifier,
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    #[serde(alias = "Database")]
    database: String,
    #[serde(alias = "Comma")]
    comma: Option<String>,
    #[serde(alias = "DefaultGroup")]
    default_group: Option<String>,
    #[serde(alias = "Accounts")]
    accounts: Vec<RawAccount>,
    #[serde(alias = "Groups")]
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    #[serde(alias = "Number")]
    number: String,
    #[serde(alias = "Name", default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGroup {
    #[serde(alias = "Name")]
    name: String,
    #[serde(alias = "Account")]
    account: Option<String>,
    #[serde(alias = "Budget")]
    budget: i64,
    #[serde(alias = "Budgets")]
    budgets: Vec<i64>,
    #[serde(alias = "Slack")]
    slack: i64,
    #[serde(alias = "Patterns")]
    patterns: Vec<String>,
    #[serde(alias = "IDs", alias = "Ids")]
    ids: Vec<String>,
    #[serde(alias = "Discard")]
    discard: bool,
}

impl Config {
    /// Parse and validate configuration from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;

        let database = if raw.database == MEMORY_DATABASE {
            raw.database
        } else {
            expand_home("database path", &raw.database)?
                .to_string_lossy()
                .into_owned()
        };

        let accounts = raw
            .accounts
            .into_iter()
            .map(|a| {
                if a.number.is_empty() {
                    return Err(Error::invalid_config("account number", a.number));
                }
                Ok(Account::new(a.number, a.name))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut names = HashSet::new();
        let mut rules = Vec::with_capacity(raw.groups.len());
        for group in raw.groups {
            if group.name.is_empty() {
                return Err(Error::invalid_config("group name", group.name));
            }
            if !names.insert(group.name.clone()) {
                return Err(Error::DuplicateGroup(group.name));
            }
            rules.push(compile_rule(group)?);
        }

        let comma = raw
            .comma
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COMMA.to_string());
        let default_group = raw
            .default_group
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| DEFAULT_GROUP.to_string());

        debug!(
            "Loaded configuration with {} account(s) and {} group(s)",
            accounts.len(),
            rules.len()
        );

        Ok(Self {
            database,
            comma,
            accounts,
            classifier: Classifier::new(rules, default_group),
        })
    }

    /// Read and parse a configuration file, expanding a leading `~`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_home("config path", &path.as_ref().to_string_lossy())?;
        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn default_group(&self) -> &str {
        self.classifier.default_group()
    }
}

fn compile_rule(group: RawGroup) -> Result<Rule> {
    if group.budgets.len() > 12 {
        return Err(Error::invalid_config(
            "budgets",
            format!("group {:?} has {} months", group.name, group.budgets.len()),
        ));
    }
    let mut months = [0; 12];
    months[..group.budgets.len()].copy_from_slice(&group.budgets);

    let patterns = group
        .patterns
        .iter()
        .map(|pattern| {
            if pattern.is_empty() {
                return Err(Error::invalid_config("pattern", format!("group {:?}", group.name)));
            }
            Regex::new(pattern).map_err(|source| Error::InvalidPattern {
                group: group.name.clone(),
                pattern: pattern.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Rule {
        account: group.account.filter(|a| !a.is_empty()),
        ids: group.ids.into_iter().collect(),
        patterns,
        budget: Budget {
            default: group.budget,
            months,
        },
        slack: group.slack,
        discard: group.discard,
        name: group.name,
    })
}

/// Expand a leading `~` to the home directory.
///
/// Only `~` and `~/...` are understood; `~user` forms are rejected.
pub fn expand_home(field: &'static str, path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        return Err(Error::invalid_config(field, path));
    }
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(PathBuf::from(path));
    };
    if !rest.is_empty() && !rest.starts_with('/') {
        return Err(Error::invalid_config(field, path));
    }
    let home = dirs::home_dir().ok_or_else(|| Error::invalid_config(field, path))?;
    Ok(home.join(rest.trim_start_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EXAMPLE_CONFIG: &str = include_str!("../../../config/journal.example.toml");

    const TEST_CONFIG: &str = r#"
Database = ":memory:"
DefaultGroup = "* no group *"

[[accounts]]
number = "1234.56.78900"
name = "My account 1"

[[accounts]]
number = "1234.56.78901"
name = "My account 2"

[[groups]]
name = "Travel"
patterns = ["^Foo"]

[[groups]]
name = "Groceries"
budget = -5000
patterns = ["^Bar", "^Baz"]

[[groups]]
name = "Misc"
ids = ["45defdf469"]

[[groups]]
name = "Other"
account = "1234.56.78901"
patterns = ["^Boo"]

[[groups]]
name = "Unimportant"
patterns = ["^Spam"]
discard = true
"#;

    fn error_of(content: &str) -> Error {
        Config::parse(content).unwrap_err()
    }

    #[test]
    fn test_parse_config() {
        let config = Config::parse(TEST_CONFIG).unwrap();
        assert_eq!(config.database, MEMORY_DATABASE);
        assert_eq!(config.comma, DEFAULT_COMMA);
        assert_eq!(config.default_group(), "* no group *");
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[1], Account::new("1234.56.78901", "My account 2"));

        let rules = config.classifier.rules();
        let names: Vec<&str> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Travel", "Groceries", "Misc", "Other", "Unimportant"]);
        assert_eq!(rules[1].patterns.len(), 2);
        assert_eq!(rules[1].budget, Budget::flat(-5000));
        assert!(rules[2].ids.contains("45defdf469"));
        assert_eq!(rules[3].account.as_deref(), Some("1234.56.78901"));
        assert!(rules[4].discard);
    }

    #[test]
    fn test_parse_example_config() {
        let config = Config::parse(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.comma, ",");
        assert!(!config.accounts.is_empty());
        assert!(!config.classifier.rules().is_empty());
    }

    #[test]
    fn test_parse_defaults() {
        let config = Config::parse("database = \"/tmp/journal.db\"").unwrap();
        assert_eq!(config.database, "/tmp/journal.db");
        assert_eq!(config.comma, ".");
        assert_eq!(config.default_group(), DEFAULT_GROUP);
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn test_parse_monthly_budgets() {
        let config = Config::parse(
            r#"
database = ":memory:"
[[groups]]
name = "Heating"
budget = -100
budgets = [-3000, -2500, -2000]
slack = -500
"#,
        )
        .unwrap();
        let rule = &config.classifier.rules()[0];
        assert_eq!(rule.budget.month(2), -2500);
        assert_eq!(rule.budget.month(7), 0);
        assert_eq!(rule.slack, -500);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            error_of(""),
            Error::InvalidConfig { field: "database path", .. }
        ));
        assert!(matches!(
            error_of("database = \"~foo/db\""),
            Error::InvalidConfig { field: "database path", .. }
        ));
        assert!(matches!(
            error_of("database = \":memory:\"\n[[accounts]]\nnumber = \"\""),
            Error::InvalidConfig { field: "account number", .. }
        ));
        assert!(matches!(
            error_of("database = \":memory:\"\n[[groups]]\npatterns = [\"^A\"]"),
            Error::InvalidConfig { field: "group name", .. }
        ));
        assert!(matches!(
            error_of("database = \":memory:\"\n[[groups]]\nname = \"A\"\npatterns = [\"\"]"),
            Error::InvalidConfig { field: "pattern", .. }
        ));
        assert!(matches!(
            error_of("database = \":memory:\"\n[[groups]]\nname = \"A\"\npatterns = [\"(\"]"),
            Error::InvalidPattern { .. }
        ));
        assert!(matches!(
            error_of("database = \":memory:\"\n[[groups]]\nname = \"A\"\n[[groups]]\nname = \"A\""),
            Error::DuplicateGroup(name) if name == "A"
        ));
        assert!(matches!(
            error_of("database = \":memory:\"\n[[groups]]\nname = \"A\"\nbudgets = [1,2,3,4,5,6,7,8,9,10,11,12,13]"),
            Error::InvalidConfig { field: "budgets", .. }
        ));
        assert!(matches!(error_of("database = 42"), Error::Toml(_)));
    }

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_home("path", "~").unwrap(), home);
        assert_eq!(expand_home("path", "~/.journal.db").unwrap(), home.join(".journal.db"));
        assert_eq!(expand_home("path", "/var/db").unwrap(), PathBuf::from("/var/db"));
        assert!(expand_home("path", "~root/db").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TEST_CONFIG.as_bytes()).unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.accounts.len(), 2);

        let missing = Config::from_file("/nonexistent/journalrc").unwrap_err();
        assert!(matches!(missing, Error::Io(_)));
    }
}
