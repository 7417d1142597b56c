use tracing::debug;

use super::{Variation, join_columns};
use crate::ast::{Assignments, set_clause, where_clause};
use crate::dialect::Dialect;
use crate::error::{SqlVaryError, SqlVaryResult};

/// Generates statement families with literal values.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariationGenerator {
    dialect: Dialect,
}

impl VariationGenerator {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Basic, COUNT, DISTINCT, ordered and limited SELECTs.
    ///
    /// DISTINCT and ORDER BY use the first column and are skipped when no
    /// columns are given.
    pub fn select_variations<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
        conditions: &Assignments,
    ) -> Vec<Variation> {
        let cols = if columns.is_empty() {
            "*".to_string()
        } else {
            join_columns(columns)
        };
        let mut basic = format!("SELECT {} FROM {}", cols, table);
        if !conditions.is_empty() {
            basic.push_str(" WHERE ");
            basic.push_str(&where_clause(conditions, self.dialect));
        }

        let mut out = vec![
            Variation::new("basic", basic.clone()),
            Variation::new("count", format!("SELECT COUNT(*) FROM {}", table)),
        ];
        if let Some(first) = columns.first() {
            let first = first.as_ref();
            out.push(Variation::new(
                "distinct",
                format!("SELECT DISTINCT {} FROM {}", first, table),
            ));
            out.push(Variation::new(
                "ordered",
                format!("{} ORDER BY {}", basic, first),
            ));
        }
        out.push(Variation::new("limited", format!("{} LIMIT 10", basic)));

        debug!(table, count = out.len(), "select variations");
        out
    }

    /// Plain INSERT, MySQL upsert, SQLite replace and INSERT ... SELECT.
    pub fn insert_variations(&self, table: &str, data: &Assignments) -> SqlVaryResult<Vec<Variation>> {
        if data.is_empty() {
            return Err(SqlVaryError::EmptyValues("INSERT"));
        }
        let cols = data.columns().collect::<Vec<_>>().join(", ");
        let vals = data
            .iter()
            .map(|(_, v)| v.to_sql(self.dialect))
            .collect::<Vec<_>>()
            .join(", ");
        let updates = data
            .columns()
            .map(|c| format!("{} = VALUES({})", c, c))
            .collect::<Vec<_>>()
            .join(", ");

        let out = vec![
            Variation::new(
                "basic",
                format!("INSERT INTO {} ({}) VALUES ({})", table, cols, vals),
            ),
            Variation::new(
                "on_duplicate_key",
                format!(
                    "INSERT INTO {} ({}) VALUES ({}) ON DUPLICATE KEY UPDATE {}",
                    table, cols, vals, updates
                ),
            ),
            Variation::new(
                "insert_or_replace",
                format!("INSERT OR REPLACE INTO {} ({}) VALUES ({})", table, cols, vals),
            ),
            Variation::new(
                "insert_select",
                format!(
                    "INSERT INTO {} ({}) SELECT {} FROM temp_table WHERE condition = 'value'",
                    table, cols, cols
                ),
            ),
        ];
        debug!(table, count = out.len(), "insert variations");
        Ok(out)
    }

    /// Plain UPDATE, UPDATE with a join, and UPDATE from a lookup subquery.
    pub fn update_variations(
        &self,
        table: &str,
        data: &Assignments,
        conditions: &Assignments,
    ) -> SqlVaryResult<Vec<Variation>> {
        let Some(first) = data.first_column() else {
            return Err(SqlVaryError::EmptyValues("UPDATE"));
        };
        let set = set_clause(data, self.dialect);
        let filter = self.where_suffix(conditions);

        let out = vec![
            Variation::new("basic", format!("UPDATE {} SET {}{}", table, set, filter)),
            Variation::new(
                "join",
                format!(
                    "UPDATE {} t1 JOIN other_table t2 ON t1.id = t2.ref_id SET {}{}",
                    table, set, filter
                ),
            ),
            Variation::new(
                "subquery",
                format!(
                    "UPDATE {t} SET {c} = (SELECT value FROM lookup_table WHERE id = {t}.lookup_id){f}",
                    t = table,
                    c = first,
                    f = filter
                ),
            ),
        ];
        debug!(table, count = out.len(), "update variations");
        Ok(out)
    }

    /// Plain DELETE, DELETE with a join, DELETE by subquery and TRUNCATE.
    pub fn delete_variations(&self, table: &str, conditions: &Assignments) -> Vec<Variation> {
        let filter = self.where_suffix(conditions);
        let out = vec![
            Variation::new("basic", format!("DELETE FROM {}{}", table, filter)),
            Variation::new(
                "join",
                format!(
                    "DELETE t1 FROM {} t1 JOIN other_table t2 ON t1.id = t2.ref_id{}",
                    table, filter
                ),
            ),
            Variation::new(
                "subquery",
                format!(
                    "DELETE FROM {} WHERE id IN (SELECT id FROM temp_table{})",
                    table, filter
                ),
            ),
            Variation::new("truncate", format!("TRUNCATE TABLE {}", table)),
        ];
        debug!(table, count = out.len(), "delete variations");
        out
    }

    /// Grouped aggregates, window functions and a daily count.
    pub fn analytical_queries(&self, table: &str, group: &str, aggregate: &str) -> Vec<Variation> {
        let out = vec![
            Variation::new(
                "count_by_group",
                format!("SELECT {g}, COUNT(*) FROM {t} GROUP BY {g}", g = group, t = table),
            ),
            Variation::new(
                "sum_by_group",
                format!(
                    "SELECT {g}, SUM({a}) FROM {t} GROUP BY {g}",
                    g = group,
                    a = aggregate,
                    t = table
                ),
            ),
            Variation::new(
                "avg_by_group",
                format!(
                    "SELECT {g}, AVG({a}) FROM {t} GROUP BY {g}",
                    g = group,
                    a = aggregate,
                    t = table
                ),
            ),
            Variation::new(
                "row_number",
                format!(
                    "SELECT {g}, {a}, ROW_NUMBER() OVER (PARTITION BY {g} ORDER BY {a}) as row_num FROM {t}",
                    g = group,
                    a = aggregate,
                    t = table
                ),
            ),
            Variation::new(
                "rank",
                format!(
                    "SELECT {g}, {a}, RANK() OVER (ORDER BY {a} DESC) as rank FROM {t}",
                    g = group,
                    a = aggregate,
                    t = table
                ),
            ),
            Variation::new(
                "daily_count",
                format!(
                    "SELECT DATE(created_at) as date, COUNT(*) FROM {} GROUP BY DATE(created_at) ORDER BY date DESC",
                    table
                ),
            ),
        ];
        debug!(table, count = out.len(), "analytical variations");
        out
    }

    fn where_suffix(&self, conditions: &Assignments) -> String {
        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clause(conditions, self.dialect))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Value;
    use crate::variations::sql_only;
    use pretty_assertions::assert_eq;

    fn generator() -> VariationGenerator {
        VariationGenerator::new(Dialect::Generic)
    }

    #[test]
    fn test_select_variations() {
        let conds = Assignments::new().with("active", true).with("role", "admin");
        let out = generator().select_variations("users", &["id", "name", "email"], &conds);
        assert_eq!(
            sql_only(&out),
            vec![
                "SELECT id, name, email FROM users WHERE active = TRUE AND role = 'admin'",
                "SELECT COUNT(*) FROM users",
                "SELECT DISTINCT id FROM users",
                "SELECT id, name, email FROM users WHERE active = TRUE AND role = 'admin' ORDER BY id",
                "SELECT id, name, email FROM users WHERE active = TRUE AND role = 'admin' LIMIT 10",
            ]
        );
    }

    #[test]
    fn test_select_without_columns() {
        let out = generator().select_variations::<&str>("users", &[], &Assignments::new());
        assert_eq!(
            sql_only(&out),
            vec![
                "SELECT * FROM users",
                "SELECT COUNT(*) FROM users",
                "SELECT * FROM users LIMIT 10",
            ]
        );
    }

    #[test]
    fn test_insert_variations() {
        let data = Assignments::new()
            .with("name", "Laptop")
            .with("price", 999.99)
            .with("category", "Electronics");
        let out = generator().insert_variations("products", &data).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(
            out[0].sql,
            "INSERT INTO products (name, price, category) VALUES ('Laptop', 999.99, 'Electronics')"
        );
        assert_eq!(
            out[1].sql,
            "INSERT INTO products (name, price, category) VALUES ('Laptop', 999.99, 'Electronics') \
             ON DUPLICATE KEY UPDATE name = VALUES(name), price = VALUES(price), category = VALUES(category)"
        );
        assert!(out[2].sql.starts_with("INSERT OR REPLACE INTO products"));
        assert_eq!(
            out[3].sql,
            "INSERT INTO products (name, price, category) SELECT name, price, category \
             FROM temp_table WHERE condition = 'value'"
        );
    }

    #[test]
    fn test_insert_requires_data() {
        assert!(generator()
            .insert_variations("t", &Assignments::new())
            .is_err());
    }

    #[test]
    fn test_update_variations() {
        let data = Assignments::new()
            .with("status", "shipped")
            .with("updated_at", Value::Raw("NOW()".into()));
        let conds = Assignments::new().with("id", 123);
        let out = generator().update_variations("orders", &data, &conds).unwrap();
        assert_eq!(
            sql_only(&out),
            vec![
                "UPDATE orders SET status = 'shipped', updated_at = NOW() WHERE id = 123",
                "UPDATE orders t1 JOIN other_table t2 ON t1.id = t2.ref_id \
                 SET status = 'shipped', updated_at = NOW() WHERE id = 123",
                "UPDATE orders SET status = (SELECT value FROM lookup_table \
                 WHERE id = orders.lookup_id) WHERE id = 123",
            ]
        );
    }

    #[test]
    fn test_delete_variations_with_comparison() {
        let conds = Assignments::new().with("created_at", "< '2024-01-01'");
        let out = generator().delete_variations("logs", &conds);
        assert_eq!(
            sql_only(&out),
            vec![
                "DELETE FROM logs WHERE created_at < '2024-01-01'",
                "DELETE t1 FROM logs t1 JOIN other_table t2 ON t1.id = t2.ref_id \
                 WHERE created_at < '2024-01-01'",
                "DELETE FROM logs WHERE id IN (SELECT id FROM temp_table \
                 WHERE created_at < '2024-01-01')",
                "TRUNCATE TABLE logs",
            ]
        );
    }

    #[test]
    fn test_delete_without_conditions() {
        let out = generator().delete_variations("logs", &Assignments::new());
        assert_eq!(out[0].sql, "DELETE FROM logs");
        assert_eq!(
            out[2].sql,
            "DELETE FROM logs WHERE id IN (SELECT id FROM temp_table)"
        );
    }

    #[test]
    fn test_analytical_queries() {
        let out = generator().analytical_queries("sales", "region", "amount");
        assert_eq!(out.len(), 6);
        assert_eq!(
            out[3].sql,
            "SELECT region, amount, ROW_NUMBER() OVER (PARTITION BY region ORDER BY amount) \
             as row_num FROM sales"
        );
        assert_eq!(
            out[5].sql,
            "SELECT DATE(created_at) as date, COUNT(*) FROM sales \
             GROUP BY DATE(created_at) ORDER BY date DESC"
        );
    }
}
