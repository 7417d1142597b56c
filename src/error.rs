//! Error types for sqlvary.

use thiserror::Error;

/// The main error type for sqlvary operations.
#[derive(Debug, Error)]
pub enum SqlVaryError {
    /// No template registered under this name.
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    /// The statement kind needs at least one column/value pair.
    #[error("No values given for {0} statement")]
    EmptyValues(&'static str),

    /// CREATE TABLE without column definitions.
    #[error("CREATE TABLE needs at least one column definition")]
    EmptyColumns,

    /// Unknown dialect name.
    #[error("Invalid dialect: '{0}'. Expected: generic, postgres, mysql, or sqlite")]
    InvalidDialect(String),

    /// Unknown join kind.
    #[error("Invalid join kind: '{0}'. Expected: inner, left, right, or full")]
    InvalidJoinKind(String),

    /// Unknown sort direction.
    #[error("Invalid sort order: '{0}'. Expected: asc or desc")]
    InvalidSortOrder(String),

    /// A `key=value` argument without `=`.
    #[error("Invalid assignment: '{0}'. Expected key=value")]
    InvalidAssignment(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SqlVaryError {
    /// Failure of the statement at 1-based `index` in a script.
    pub fn statement_failed(index: usize, cause: impl std::fmt::Display) -> Self {
        Self::Execution(format!("statement {} failed: {}", index, cause))
    }
}

/// Result type alias for sqlvary operations.
pub type SqlVaryResult<T> = Result<T, SqlVaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SqlVaryError::statement_failed(2, "no such table: missing");
        assert_eq!(
            err.to_string(),
            "Execution error: statement 2 failed: no such table: missing"
        );
    }

    #[test]
    fn test_sort_order_display() {
        let err = SqlVaryError::InvalidSortOrder("up".into());
        assert_eq!(err.to_string(), "Invalid sort order: 'up'. Expected: asc or desc");
    }
}
