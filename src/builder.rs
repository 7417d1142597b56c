//! Fluent SQL builder.
//!
//! Clauses are accumulated in any order and laid out in canonical SQL order
//! by [`QueryBuilder::build`]. Column lists and conditions are trusted
//! verbatim; only values bound with [`QueryBuilder::set_value`] are
//! rendered as literals.
//!
//! ```
//! use sqlvary::builder::QueryBuilder;
//! use sqlvary::ast::{JoinKind, SortOrder};
//! use sqlvary::dialect::Dialect;
//!
//! let sql = QueryBuilder::new()
//!     .select(["u.name", "COUNT(o.id) as order_count"])
//!     .from_table("users", Some("u"))
//!     .join("orders o", "u.id = o.user_id", JoinKind::Left, None)
//!     .where_("u.active = 1")
//!     .group_by(["u.name"])
//!     .order_by("order_count", SortOrder::Desc)
//!     .limit(10, None)
//!     .build(Dialect::Generic)
//!     .unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT u.name, COUNT(o.id) as order_count FROM users u \
//!      LEFT JOIN orders o ON u.id = o.user_id WHERE u.active = 1 \
//!      GROUP BY u.name ORDER BY order_count DESC LIMIT 10"
//! );
//! ```

use tracing::debug;

use crate::ast::{
    Assignments, ColumnDef, Join, JoinKind, QueryKind, SortOrder, TableRef, Value, set_clause,
};
use crate::dialect::Dialect;
use crate::error::{SqlVaryError, SqlVaryResult};

/// Accumulates the parts of one statement.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    kind: QueryKind,
    /// FROM table of a SELECT.
    from: Option<TableRef>,
    /// Table of an INSERT, UPDATE, DELETE or CREATE TABLE; always set
    /// together with `kind`.
    target: String,
    columns: Vec<String>,
    joins: Vec<Join>,
    conditions: Vec<String>,
    group_by: Vec<String>,
    having: Vec<String>,
    order_by: Vec<(String, SortOrder)>,
    limit: Option<(u64, Option<u64>)>,
    values: Assignments,
    definitions: Vec<ColumnDef>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all state; the builder becomes an empty SELECT.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Add SELECT columns.
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Set the main table.
    pub fn from_table(&mut self, table: impl Into<String>, alias: Option<&str>) -> &mut Self {
        self.from = Some(TableRef {
            name: table.into(),
            alias: alias.map(str::to_string),
        });
        self
    }

    /// Add a join. `table` may already carry an alias (`"orders o"`).
    pub fn join(
        &mut self,
        table: impl Into<String>,
        on: impl Into<String>,
        kind: JoinKind,
        alias: Option<&str>,
    ) -> &mut Self {
        self.joins.push(Join {
            table: TableRef {
                name: table.into(),
                alias: alias.map(str::to_string),
            },
            kind,
            on: on.into(),
        });
        self
    }

    /// Add a WHERE condition; conditions are AND-ed.
    pub fn where_(&mut self, condition: impl Into<String>) -> &mut Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add a HAVING condition; conditions are AND-ed.
    pub fn having(&mut self, condition: impl Into<String>) -> &mut Self {
        self.having.push(condition.into());
        self
    }

    pub fn order_by(&mut self, column: impl Into<String>, order: SortOrder) -> &mut Self {
        self.order_by.push((column.into(), order));
        self
    }

    /// Set LIMIT and optional OFFSET. A zero offset is not emitted.
    pub fn limit(&mut self, count: u64, offset: Option<u64>) -> &mut Self {
        self.limit = Some((count, offset));
        self
    }

    pub fn insert_into(&mut self, table: impl Into<String>) -> &mut Self {
        self.kind = QueryKind::Insert;
        self.target = table.into();
        self
    }

    pub fn update(&mut self, table: impl Into<String>) -> &mut Self {
        self.kind = QueryKind::Update;
        self.target = table.into();
        self
    }

    pub fn delete_from(&mut self, table: impl Into<String>) -> &mut Self {
        self.kind = QueryKind::Delete;
        self.target = table.into();
        self
    }

    pub fn create_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.kind = QueryKind::CreateTable;
        self.target = table.into();
        self
    }

    /// Add a CREATE TABLE column definition.
    pub fn column(&mut self, def: ColumnDef) -> &mut Self {
        self.definitions.push(def);
        self
    }

    /// Bind a value for INSERT/UPDATE.
    pub fn set_value(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.set(column, value);
        self
    }

    /// Bind several values for INSERT/UPDATE.
    pub fn set_values(&mut self, values: &Assignments) -> &mut Self {
        for (c, v) in values.iter() {
            self.values.set(c, v.clone());
        }
        self
    }

    /// Render the statement.
    pub fn build(&self, dialect: Dialect) -> SqlVaryResult<String> {
        let sql = match self.kind {
            QueryKind::Select => self.build_select(),
            QueryKind::Insert => self.build_insert(dialect)?,
            QueryKind::Update => self.build_update(dialect)?,
            QueryKind::Delete => self.build_delete(),
            QueryKind::CreateTable => self.build_create_table()?,
        };
        debug!(kind = %self.kind, %sql, "built statement");
        Ok(sql)
    }

    fn where_sql(&self) -> Option<String> {
        if self.conditions.is_empty() {
            None
        } else {
            Some(format!("WHERE {}", self.conditions.join(" AND ")))
        }
    }

    fn build_select(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        let cols = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        parts.push(format!("SELECT {}", cols));

        if let Some(table) = &self.from {
            parts.push(format!("FROM {}", table));
        }

        parts.extend(self.joins.iter().map(|j| j.to_string()));

        if let Some(w) = self.where_sql() {
            parts.push(w);
        }

        if !self.group_by.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by.join(", ")));
        }

        if !self.having.is_empty() {
            parts.push(format!("HAVING {}", self.having.join(" AND ")));
        }

        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|(c, dir)| format!("{} {}", c, dir.as_sql()))
                .collect();
            parts.push(format!("ORDER BY {}", order.join(", ")));
        }

        if let Some((count, offset)) = self.limit {
            let mut lim = format!("LIMIT {}", count);
            if let Some(off) = offset.filter(|o| *o > 0) {
                lim.push_str(&format!(" OFFSET {}", off));
            }
            parts.push(lim);
        }

        parts.join(" ")
    }

    fn build_insert(&self, dialect: Dialect) -> SqlVaryResult<String> {
        if self.values.is_empty() {
            return Err(SqlVaryError::EmptyValues("INSERT"));
        }
        let cols: Vec<&str> = self.values.columns().collect();
        let vals: Vec<String> = self.values.iter().map(|(_, v)| v.to_sql(dialect)).collect();
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.target,
            cols.join(", "),
            vals.join(", ")
        ))
    }

    fn build_update(&self, dialect: Dialect) -> SqlVaryResult<String> {
        if self.values.is_empty() {
            return Err(SqlVaryError::EmptyValues("UPDATE"));
        }
        let mut sql = format!("UPDATE {} SET {}", self.target, set_clause(&self.values, dialect));
        if let Some(w) = self.where_sql() {
            sql.push(' ');
            sql.push_str(&w);
        }
        Ok(sql)
    }

    fn build_delete(&self) -> String {
        let mut sql = format!("DELETE FROM {}", self.target);
        if let Some(w) = self.where_sql() {
            sql.push(' ');
            sql.push_str(&w);
        }
        sql
    }

    fn build_create_table(&self) -> SqlVaryResult<String> {
        if self.definitions.is_empty() {
            return Err(SqlVaryError::EmptyColumns);
        }
        let defs: Vec<String> = self.definitions.iter().map(|d| d.to_string()).collect();
        Ok(format!("CREATE TABLE {} ({})", self.target, defs.join(", ")))
    }
}
