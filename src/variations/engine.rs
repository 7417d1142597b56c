use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Variation, join_columns};
use crate::ast::JoinKind;
use crate::dialect::Dialect;

fn default_primary_key() -> String {
    "id".to_string()
}

fn default_date_column() -> String {
    "created_at".to_string()
}

/// Input for [`VariationEngine::crud_variations`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrudConfig {
    pub table: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
}

impl CrudConfig {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec![],
            primary_key: default_primary_key(),
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn primary_key(mut self, pk: impl Into<String>) -> Self {
        self.primary_key = pk.into();
        self
    }
}

/// Input for [`VariationEngine::analytical_variations`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub table: String,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    #[serde(default)]
    pub group_columns: Vec<String>,
    #[serde(default)]
    pub numeric_columns: Vec<String>,
}

impl AnalyticsConfig {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            date_column: default_date_column(),
            group_columns: vec![],
            numeric_columns: vec![],
        }
    }
}

/// One joined table for [`VariationEngine::join_variations`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinTarget {
    pub table: String,
    pub on: String,
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: JoinKind,
}

/// Input for [`VariationEngine::join_variations`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub main_table: String,
    #[serde(default)]
    pub joins: Vec<JoinTarget>,
}

/// CRUD statement families, in select/insert/update/delete order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrudVariations {
    pub select: Vec<Variation>,
    pub insert: Vec<Variation>,
    pub update: Vec<Variation>,
    pub delete: Vec<Variation>,
}

impl CrudVariations {
    /// Families with their operation name, in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[Variation])> {
        [
            ("select", self.select.as_slice()),
            ("insert", self.insert.as_slice()),
            ("update", self.update.as_slice()),
            ("delete", self.delete.as_slice()),
        ]
        .into_iter()
    }

    pub fn len(&self) -> usize {
        self.select.len() + self.insert.len() + self.update.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generates statement families from configuration. Values are left as
/// positional placeholders in the dialect's style.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariationEngine {
    dialect: Dialect,
}

impl VariationEngine {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    fn ph(&self, index: usize) -> String {
        self.dialect.placeholder(index)
    }

    pub fn crud_variations(&self, config: &CrudConfig) -> CrudVariations {
        let t = &config.table;
        let pk = &config.primary_key;
        let cols = &config.columns;
        let mut out = CrudVariations::default();

        let col_list = if cols.is_empty() {
            "*".to_string()
        } else {
            join_columns(cols)
        };
        out.select = vec![
            Variation::new("all", format!("SELECT * FROM {}", t)),
            Variation::new("columns", format!("SELECT {} FROM {}", col_list, t)),
            Variation::new("count", format!("SELECT COUNT(*) FROM {}", t)),
            Variation::new(
                "latest",
                format!("SELECT * FROM {} ORDER BY {} DESC LIMIT 10", t, pk),
            ),
            match cols.first() {
                Some(first) => {
                    Variation::new("distinct", format!("SELECT DISTINCT {} FROM {}", first, t))
                }
                None => Variation::new("distinct", format!("SELECT * FROM {}", t)),
            },
        ];

        if let Some(first) = cols.first() {
            let placeholders = self.dialect.placeholders(1, cols.len());
            out.insert = vec![
                Variation::new(
                    "basic",
                    format!("INSERT INTO {} ({}) VALUES ({})", t, col_list, placeholders),
                ),
                Variation::new(
                    "insert_or_ignore",
                    format!(
                        "INSERT OR IGNORE INTO {} ({}) VALUES ({})",
                        t, col_list, placeholders
                    ),
                ),
                Variation::new(
                    "from_temp",
                    format!(
                        "INSERT INTO {t} ({c}) SELECT {c} FROM temp_{t}",
                        t = t,
                        c = col_list
                    ),
                ),
            ];

            let set = cols
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{} = {}", c, self.ph(i + 1)))
                .collect::<Vec<_>>()
                .join(", ");
            out.update = vec![
                Variation::new(
                    "by_key",
                    format!(
                        "UPDATE {} SET {} WHERE {} = {}",
                        t,
                        set,
                        pk,
                        self.ph(cols.len() + 1)
                    ),
                ),
                Variation::new(
                    "by_temp_ids",
                    format!(
                        "UPDATE {t} SET {c} = {p} WHERE {pk} IN (SELECT {pk} FROM temp_ids)",
                        t = t,
                        c = first,
                        p = self.ph(1),
                        pk = pk
                    ),
                ),
            ];
        }

        out.delete = vec![
            Variation::new(
                "by_key",
                format!("DELETE FROM {} WHERE {} = {}", t, pk, self.ph(1)),
            ),
            Variation::new(
                "older_than",
                format!("DELETE FROM {} WHERE created_at < {}", t, self.ph(1)),
            ),
            Variation::new(
                "by_keys",
                format!(
                    "DELETE FROM {} WHERE {} IN ({})",
                    t,
                    pk,
                    self.dialect.placeholders(1, 3)
                ),
            ),
        ];

        debug!(table = %t, count = out.len(), "crud variations");
        out
    }

    pub fn analytical_variations(&self, config: &AnalyticsConfig) -> Vec<Variation> {
        let t = &config.table;
        let d = &config.date_column;
        let mut out = vec![
            Variation::new(
                "daily",
                format!(
                    "SELECT DATE({d}) as date, COUNT(*) FROM {t} GROUP BY DATE({d})",
                    d = d,
                    t = t
                ),
            ),
            Variation::new(
                "monthly",
                format!(
                    "SELECT {y} as year, {m} as month, COUNT(*) FROM {t} GROUP BY {y}, {m}",
                    y = self.dialect.year_of(d),
                    m = self.dialect.month_of(d),
                    t = t
                ),
            ),
            Variation::new(
                "last_30_days",
                format!(
                    "SELECT * FROM {} WHERE {} >= {}",
                    t,
                    d,
                    self.dialect.days_ago(30)
                ),
            ),
        ];

        for col in &config.group_columns {
            out.push(Variation::new(
                format!("top_{}", col),
                format!(
                    "SELECT {c}, COUNT(*) as count FROM {t} GROUP BY {c} ORDER BY count DESC",
                    c = col,
                    t = t
                ),
            ));
            out.push(Variation::new(
                format!("frequent_{}", col),
                format!(
                    "SELECT {c}, COUNT(*) as count FROM {t} GROUP BY {c} HAVING count > 10",
                    c = col,
                    t = t
                ),
            ));
        }

        for col in &config.numeric_columns {
            out.push(Variation::new(
                format!("stats_{}", col),
                format!(
                    "SELECT AVG({c}), MIN({c}), MAX({c}), SUM({c}) FROM {t}",
                    c = col,
                    t = t
                ),
            ));
            out.push(Variation::new(
                format!("rank_{}", col),
                format!(
                    "SELECT {c}, ROW_NUMBER() OVER (ORDER BY {c} DESC) as rank FROM {t}",
                    c = col,
                    t = t
                ),
            ));
        }

        if let (Some(g), Some(n)) = (config.group_columns.first(), config.numeric_columns.first()) {
            out.push(Variation::new(
                "avg_by_group",
                format!(
                    "SELECT {g}, {n}, AVG({n}) OVER (PARTITION BY {g}) as avg_by_group FROM {t}",
                    g = g,
                    n = n,
                    t = t
                ),
            ));
            out.push(Variation::new(
                "rank_in_group",
                format!(
                    "SELECT {g}, {n}, RANK() OVER (PARTITION BY {g} ORDER BY {n} DESC) \
                     as rank_in_group FROM {t}",
                    g = g,
                    n = n,
                    t = t
                ),
            ));
        }

        debug!(table = %t, count = out.len(), "analytical variations");
        out
    }

    pub fn join_variations(&self, spec: &JoinSpec) -> Vec<Variation> {
        let m = &spec.main_table;
        let mut out = Vec::with_capacity(spec.joins.len() * 3);
        for join in &spec.joins {
            let clause = format!("{} {} ON {}", join.kind, join.table, join.on);
            out.push(Variation::new(
                format!("{}_all", join.table),
                format!("SELECT * FROM {} {}", m, clause),
            ));
            out.push(Variation::new(
                format!("{}_name", join.table),
                format!("SELECT {m}.*, {j}.name FROM {m} {c}", m = m, j = join.table, c = clause),
            ));
            out.push(Variation::new(
                format!("{}_count", join.table),
                format!("SELECT COUNT(*) FROM {} {}", m, clause),
            ));
        }
        debug!(table = %m, count = out.len(), "join variations");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variations::sql_only;
    use pretty_assertions::assert_eq;

    fn products() -> CrudConfig {
        CrudConfig::new("products")
            .columns(["name", "price", "category", "description"])
            .primary_key("product_id")
    }

    #[test]
    fn test_crud_selects() {
        let out = VariationEngine::new(Dialect::Sqlite).crud_variations(&products());
        assert_eq!(
            sql_only(&out.select),
            vec![
                "SELECT * FROM products",
                "SELECT name, price, category, description FROM products",
                "SELECT COUNT(*) FROM products",
                "SELECT * FROM products ORDER BY product_id DESC LIMIT 10",
                "SELECT DISTINCT name FROM products",
            ]
        );
    }

    #[test]
    fn test_crud_placeholders_sqlite() {
        let out = VariationEngine::new(Dialect::Sqlite).crud_variations(&products());
        assert_eq!(
            out.insert[0].sql,
            "INSERT INTO products (name, price, category, description) VALUES (?, ?, ?, ?)"
        );
        assert_eq!(
            out.insert[2].sql,
            "INSERT INTO products (name, price, category, description) \
             SELECT name, price, category, description FROM temp_products"
        );
        assert_eq!(
            out.update[0].sql,
            "UPDATE products SET name = ?, price = ?, category = ?, description = ? \
             WHERE product_id = ?"
        );
        assert_eq!(
            out.delete[2].sql,
            "DELETE FROM products WHERE product_id IN (?, ?, ?)"
        );
    }

    #[test]
    fn test_crud_placeholders_postgres() {
        let out = VariationEngine::new(Dialect::Postgres).crud_variations(&products());
        assert_eq!(
            out.update[0].sql,
            "UPDATE products SET name = $1, price = $2, category = $3, description = $4 \
             WHERE product_id = $5"
        );
        assert_eq!(
            out.update[1].sql,
            "UPDATE products SET name = $1 WHERE product_id IN (SELECT product_id FROM temp_ids)"
        );
        assert_eq!(out.delete[2].sql, "DELETE FROM products WHERE product_id IN ($1, $2, $3)");
    }

    #[test]
    fn test_crud_without_columns() {
        let out = VariationEngine::default().crud_variations(&CrudConfig::new("logs"));
        assert_eq!(out.select.len(), 5);
        assert_eq!(out.select[4].sql, "SELECT * FROM logs");
        assert!(out.insert.is_empty());
        assert!(out.update.is_empty());
        assert_eq!(out.delete.len(), 3);
        let names: Vec<&str> = out.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["select", "insert", "update", "delete"]);
    }

    #[test]
    fn test_analytical_variations() {
        let config = AnalyticsConfig {
            table: "api_logs".into(),
            date_column: "timestamp".into(),
            group_columns: vec!["endpoint".into(), "method".into(), "status_code".into()],
            numeric_columns: vec!["response_time_ms".into(), "request_size_bytes".into()],
        };
        let out = VariationEngine::default().analytical_variations(&config);
        // 3 time-based + 2 per group column + 2 per numeric column + 2 windows
        assert_eq!(out.len(), 3 + 6 + 4 + 2);
        assert_eq!(
            out[2].sql,
            "SELECT * FROM api_logs WHERE timestamp >= DATE_SUB(NOW(), INTERVAL 30 DAY)"
        );
        assert_eq!(
            out[3].sql,
            "SELECT endpoint, COUNT(*) as count FROM api_logs GROUP BY endpoint ORDER BY count DESC"
        );
        assert_eq!(
            out.last().unwrap().sql,
            "SELECT endpoint, response_time_ms, RANK() OVER (PARTITION BY endpoint \
             ORDER BY response_time_ms DESC) as rank_in_group FROM api_logs"
        );
    }

    #[test]
    fn test_analytical_minimal() {
        let out = VariationEngine::new(Dialect::Postgres)
            .analytical_variations(&AnalyticsConfig::new("orders"));
        assert_eq!(out.len(), 3);
        assert_eq!(
            out[0].sql,
            "SELECT DATE(created_at) as date, COUNT(*) FROM orders GROUP BY DATE(created_at)"
        );
        assert_eq!(
            out[2].sql,
            "SELECT * FROM orders WHERE created_at >= NOW() - INTERVAL '30 days'"
        );
    }

    #[test]
    fn test_join_variations() {
        let spec = JoinSpec {
            main_table: "orders".into(),
            joins: vec![
                JoinTarget {
                    table: "customers".into(),
                    on: "orders.customer_id = customers.id".into(),
                    kind: JoinKind::Inner,
                },
                JoinTarget {
                    table: "shipments".into(),
                    on: "orders.id = shipments.order_id".into(),
                    kind: JoinKind::Left,
                },
            ],
        };
        let out = VariationEngine::default().join_variations(&spec);
        assert_eq!(
            sql_only(&out),
            vec![
                "SELECT * FROM orders INNER JOIN customers ON orders.customer_id = customers.id",
                "SELECT orders.*, customers.name FROM orders INNER JOIN customers \
                 ON orders.customer_id = customers.id",
                "SELECT COUNT(*) FROM orders INNER JOIN customers ON orders.customer_id = customers.id",
                "SELECT * FROM orders LEFT JOIN shipments ON orders.id = shipments.order_id",
                "SELECT orders.*, shipments.name FROM orders LEFT JOIN shipments \
                 ON orders.id = shipments.order_id",
                "SELECT COUNT(*) FROM orders LEFT JOIN shipments ON orders.id = shipments.order_id",
            ]
        );
    }

    #[test]
    fn test_join_spec_from_json() {
        let spec: JoinSpec = serde_json::from_str(
            r#"{"main_table": "users", "joins": [{"table": "orders", "on": "users.id = orders.user_id", "type": "left"}, {"table": "profiles", "on": "users.id = profiles.user_id"}]}"#,
        )
        .unwrap();
        assert_eq!(spec.joins[0].kind, JoinKind::Left);
        assert_eq!(spec.joins[1].kind, JoinKind::Inner);
    }

    #[test]
    fn test_join_spec_uppercase_types() {
        let spec: JoinSpec = serde_json::from_str(
            r#"{"main_table": "orders", "joins": [{"table": "customers", "on": "orders.customer_id = customers.id", "type": "LEFT"}, {"table": "items", "on": "orders.id = items.order_id", "type": "INNER"}]}"#,
        )
        .unwrap();
        assert_eq!(spec.joins[0].kind, JoinKind::Left);
        assert_eq!(spec.joins[1].kind, JoinKind::Inner);
        assert!(
            serde_json::from_str::<JoinTarget>(r#"{"table": "t", "on": "x", "type": "CROSS"}"#)
                .is_err()
        );
    }

    #[test]
    fn test_monthly_uses_dialect_date_parts() {
        let config = AnalyticsConfig::new("orders");
        let monthly = |dialect| {
            VariationEngine::new(dialect)
                .analytical_variations(&config)
                .into_iter()
                .find(|v| v.label == "monthly")
                .map(|v| v.sql)
                .unwrap()
        };
        assert_eq!(
            monthly(Dialect::Sqlite),
            "SELECT STRFTIME('%Y', created_at) as year, STRFTIME('%m', created_at) as month, \
             COUNT(*) FROM orders GROUP BY STRFTIME('%Y', created_at), STRFTIME('%m', created_at)"
        );
        assert_eq!(
            monthly(Dialect::MySql),
            "SELECT YEAR(created_at) as year, MONTH(created_at) as month, COUNT(*) FROM orders \
             GROUP BY YEAR(created_at), MONTH(created_at)"
        );
    }
}
