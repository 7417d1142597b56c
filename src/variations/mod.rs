//! Variation generators.
//!
//! A variation family is a fixed list of related statements produced from
//! the same variables: a table, its columns, some values and conditions.
//! [`VariationGenerator`] renders literal values; [`VariationEngine`] works
//! from configuration and emits parameter placeholders instead.

mod basic;
mod engine;

pub use basic::VariationGenerator;
pub use engine::{
    AnalyticsConfig, CrudConfig, CrudVariations, JoinSpec, JoinTarget, VariationEngine,
};

use serde::Serialize;

/// One generated statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variation {
    /// Short name of the variation within its family.
    pub label: String,
    pub sql: String,
}

impl Variation {
    pub fn new(label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sql: sql.into(),
        }
    }
}

/// Collect just the SQL text of a family.
pub fn sql_only(variations: &[Variation]) -> Vec<&str> {
    variations.iter().map(|v| v.sql.as_str()).collect()
}

fn join_columns<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}
