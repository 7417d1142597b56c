//! Building blocks shared by the builder and the variation generators.

pub mod conditions;
pub mod joins;
pub mod values;

pub use conditions::*;
pub use joins::*;
pub use values::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statement kind produced by [`crate::builder::QueryBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
            QueryKind::CreateTable => "CREATE TABLE",
        };
        write!(f, "{}", name)
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = crate::error::SqlVaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(crate::error::SqlVaryError::InvalidSortOrder(s.to_string())),
        }
    }
}

/// A table reference with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} {}", self.name, alias),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A column definition for CREATE TABLE, e.g. `id INTEGER PRIMARY KEY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            constraints: vec![],
        }
    }

    pub fn constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        for c in &self.constraints {
            write!(f, " {}", c)?;
        }
        Ok(())
    }
}

/// Ordered column/value pairs. Insertion order is kept; re-assigning a
/// column replaces its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assignments {
    pairs: Vec<(String, Value)>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let column = column.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((column, value)),
        }
        self
    }

    /// Builder-style variant of [`Assignments::set`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Parse `key=value` strings, inferring value types.
    pub fn parse_pairs<S: AsRef<str>>(items: &[S]) -> crate::error::SqlVaryResult<Self> {
        let mut out = Self::new();
        for item in items {
            let item = item.as_ref();
            let (k, v) = item
                .split_once('=')
                .ok_or_else(|| crate::error::SqlVaryError::InvalidAssignment(item.to_string()))?;
            let k = k.trim();
            if k.is_empty() {
                return Err(crate::error::SqlVaryError::InvalidAssignment(
                    item.to_string(),
                ));
            }
            out.set(k, Value::infer(v));
        }
        Ok(out)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.pairs.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn first_column(&self) -> Option<&str> {
        self.pairs.first().map(|(c, _)| c.as_str())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Assignments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.set(k, v);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignments_keep_order_and_replace() {
        let mut a = Assignments::new();
        a.set("b", 1).set("a", 2).set("b", 3);
        let cols: Vec<&str> = a.columns().collect();
        assert_eq!(cols, vec!["b", "a"]);
        assert_eq!(a.iter().next().unwrap().1, &Value::Int(3));
    }

    #[test]
    fn test_parse_pairs() {
        let a = Assignments::parse_pairs(&["name=Laptop", "price=999.99", "updated_at=NOW()"])
            .unwrap();
        let values: Vec<&Value> = a.iter().map(|(_, v)| v).collect();
        assert_eq!(values[0], &Value::Text("Laptop".into()));
        assert_eq!(values[1], &Value::Float(999.99));
        assert_eq!(values[2], &Value::Raw("NOW()".into()));
    }

    #[test]
    fn test_parse_pairs_rejects_missing_equals() {
        assert!(Assignments::parse_pairs(&["name"]).is_err());
        assert!(Assignments::parse_pairs(&["=x"]).is_err());
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!(matches!(
            "up".parse::<SortOrder>(),
            Err(crate::error::SqlVaryError::InvalidSortOrder(s)) if s == "up"
        ));
    }

    #[test]
    fn test_table_ref_display() {
        assert_eq!(TableRef::aliased("users", "u").to_string(), "users u");
        assert_eq!(TableRef::new("users").to_string(), "users");
    }
}
