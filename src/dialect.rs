//! SQL dialects.
//!
//! Dialects only affect spelling: literals, placeholders, quoted identifiers
//! and date functions. The shape of each variation family is the
//! same in every dialect.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SqlVaryError;

/// Per-dialect spelling rules.
pub trait SqlGenerator {
    /// Quote an identifier.
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Positional parameter placeholder (1-based index).
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    /// Boolean literal.
    fn bool_literal(&self, val: bool) -> String {
        if val { "TRUE" } else { "FALSE" }.to_string()
    }

    /// Expression for "now minus `days` days".
    fn days_ago(&self, days: u32) -> String {
        format!("DATE_SUB(NOW(), INTERVAL {} DAY)", days)
    }

    /// Calendar year of a date expression.
    fn year_of(&self, expr: &str) -> String {
        format!("YEAR({})", expr)
    }

    /// Month number of a date expression.
    fn month_of(&self, expr: &str) -> String {
        format!("MONTH({})", expr)
    }
}

pub struct GenericGenerator;

impl SqlGenerator for GenericGenerator {}

pub struct PostgresGenerator;

impl SqlGenerator for PostgresGenerator {
    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn days_ago(&self, days: u32) -> String {
        format!("NOW() - INTERVAL '{} days'", days)
    }

    fn year_of(&self, expr: &str) -> String {
        format!("EXTRACT(YEAR FROM {})", expr)
    }

    fn month_of(&self, expr: &str) -> String {
        format!("EXTRACT(MONTH FROM {})", expr)
    }
}

pub struct MysqlGenerator;

impl SqlGenerator for MysqlGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "1" } else { "0" }.to_string()
    }
}

pub struct SqliteGenerator;

impl SqlGenerator for SqliteGenerator {
    fn bool_literal(&self, val: bool) -> String {
        if val { "1" } else { "0" }.to_string()
    }

    fn days_ago(&self, days: u32) -> String {
        format!("DATETIME('now', '-{} days')", days)
    }

    fn year_of(&self, expr: &str) -> String {
        format!("STRFTIME('%Y', {})", expr)
    }

    fn month_of(&self, expr: &str) -> String {
        format!("STRFTIME('%m', {})", expr)
    }
}

/// Supported SQL dialects.
///
/// Config files and the CLI accept the same names, through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Dialect {
    #[default]
    Generic,
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    pub fn generator(&self) -> Box<dyn SqlGenerator> {
        match self {
            Dialect::Generic => Box::new(GenericGenerator),
            Dialect::Postgres => Box::new(PostgresGenerator),
            Dialect::MySql => Box::new(MysqlGenerator),
            Dialect::Sqlite => Box::new(SqliteGenerator),
        }
    }

    pub fn placeholder(&self, index: usize) -> String {
        self.generator().placeholder(index)
    }

    pub fn bool_literal(&self, val: bool) -> String {
        self.generator().bool_literal(val)
    }

    pub fn quote_identifier(&self, name: &str) -> String {
        self.generator().quote_identifier(name)
    }

    pub fn days_ago(&self, days: u32) -> String {
        self.generator().days_ago(days)
    }

    pub fn year_of(&self, expr: &str) -> String {
        self.generator().year_of(expr)
    }

    pub fn month_of(&self, expr: &str) -> String {
        self.generator().month_of(expr)
    }

    /// Comma-separated placeholders numbered `start..start + count`.
    pub fn placeholders(&self, start: usize, count: usize) -> String {
        (start..start + count)
            .map(|i| self.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Dialect {
    type Err = SqlVaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(Dialect::Generic),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            "sqlite" => Ok(Dialect::Sqlite),
            _ => Err(SqlVaryError::InvalidDialect(s.to_string())),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = SqlVaryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Generic => "generic",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        };
        write!(f, "{}", name)
    }
}
