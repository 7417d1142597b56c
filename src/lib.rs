//! # sqlvary
//!
//! > **One set of variables, many SQL statements.**
//!
//! sqlvary turns a table name, some columns and a handful of values into
//! families of related SQL statements, and checks the Markdown SQL reference
//! outline that documents them.
//!
//! ## Quick Example
//!
//! ```
//! use sqlvary::prelude::*;
//!
//! let generator = VariationGenerator::new(Dialect::Postgres);
//! let conditions = Assignments::new().with("role", "admin");
//! let queries = generator.select_variations("users", &["id", "email"], &conditions);
//!
//! assert_eq!(queries[0].sql, "SELECT id, email FROM users WHERE role = 'admin'");
//! assert_eq!(queries[1].sql, "SELECT COUNT(*) FROM users");
//! ```
//!
//! ## Generators
//!
//! | Piece                 | Input                      | Output                     |
//! |-----------------------|----------------------------|----------------------------|
//! | `QueryBuilder`        | fluent clause calls        | one statement              |
//! | `VariationGenerator`  | table, columns, values     | literal statement families |
//! | `VariationEngine`     | CRUD/analytics/join config | placeholder families       |
//! | `TemplateEngine`      | named template + variables | one statement              |
//! | `scenarios`           | nothing                    | canned demo reports        |

pub mod ast;
pub mod builder;
pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod lint;
pub mod scenarios;
pub mod template;
pub mod variations;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::builder::QueryBuilder;
    pub use crate::config::Config;
    pub use crate::dialect::Dialect;
    pub use crate::engine::SqlRunner;
    pub use crate::error::*;
    pub use crate::lint::{LintIssue, LintLevel, LintReport, lint_file, lint_markdown};
    pub use crate::template::TemplateEngine;
    pub use crate::variations::{
        AnalyticsConfig, CrudConfig, CrudVariations, JoinSpec, JoinTarget, Variation,
        VariationEngine, VariationGenerator,
    };
}

/// Render a named built-in template.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// let vars = HashMap::from([
///     ("table".to_string(), "users".to_string()),
///     ("columns".to_string(), "*".to_string()),
/// ]);
/// let sql = sqlvary::generate("basic_select", &vars).unwrap();
/// assert_eq!(sql, "SELECT * FROM users");
/// ```
pub fn generate(
    template: &str,
    vars: &std::collections::HashMap<String, String>,
) -> Result<String, error::SqlVaryError> {
    template::TemplateEngine::new().generate(template, vars)
}
