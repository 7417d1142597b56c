use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ast::TableRef;
use crate::error::SqlVaryError;

/// Join type.
///
/// Deserializes through [`FromStr`], so `"LEFT"`, `"left"` and
/// `"left outer"` are all accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    /// The join keyword without the trailing `JOIN`, as used in
    /// `<KIND> JOIN table ON ...`.
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL OUTER",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} JOIN", self.keyword())
    }
}

impl FromStr for JoinKind {
    type Err = SqlVaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_uppercase();
        let norm = norm.strip_suffix(" JOIN").unwrap_or(&norm);
        match norm {
            "INNER" => Ok(JoinKind::Inner),
            "LEFT" | "LEFT OUTER" => Ok(JoinKind::Left),
            "RIGHT" | "RIGHT OUTER" => Ok(JoinKind::Right),
            "FULL" | "FULL OUTER" => Ok(JoinKind::Full),
            _ => Err(SqlVaryError::InvalidJoinKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for JoinKind {
    type Error = SqlVaryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A join definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: TableRef,
    pub kind: JoinKind,
    /// Raw ON condition, emitted verbatim.
    pub on: String,
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ON {}", self.kind, self.table, self.on)
    }
}
