//! Canned end-to-end scenarios, one report per workload.

use std::collections::HashMap;

use serde::Serialize;

use crate::ast::{Assignments, JoinKind, Value};
use crate::builder::QueryBuilder;
use crate::dialect::Dialect;
use crate::error::SqlVaryResult;
use crate::template::TemplateEngine;
use crate::variations::{AnalyticsConfig, Variation, VariationEngine, VariationGenerator};

/// A titled list of generated statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: String,
    pub queries: Vec<String>,
}

impl Section {
    fn new(heading: impl Into<String>, queries: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            queries,
        }
    }

    fn from_variations(heading: impl Into<String>, variations: Vec<Variation>) -> Self {
        Self::new(heading, variations.into_iter().map(|v| v.sql).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Report {
    pub fn query_count(&self) -> usize {
        self.sections.iter().map(|s| s.queries.len()).sum()
    }
}

/// Product listings and order analytics.
pub fn ecommerce(dialect: Dialect) -> Report {
    let generator = VariationGenerator::new(dialect);
    let conditions = Assignments::new()
        .with("active", true)
        .with("stock_quantity", Value::Condition("> 0".into()));
    let products = generator.select_variations(
        "products",
        &["id", "name", "price", "category", "stock_quantity"],
        &conditions,
    );
    let analytics = generator.analytical_queries("orders", "status", "total_amount");

    Report {
        title: "E-commerce".into(),
        sections: vec![
            Section::from_variations("Product Queries", products),
            Section::from_variations("Order Analytics", analytics),
        ],
    }
}

/// Builder-driven user queries.
pub fn user_management(dialect: Dialect) -> SqlVaryResult<Report> {
    let mut builder = QueryBuilder::new();
    let mut sections = Vec::new();

    let sql = builder
        .select(["id", "username", "email", "subscription_expires"])
        .from_table("users", Some("u"))
        .where_("active = 1")
        .where_("subscription_type = 'premium'")
        .build(dialect)?;
    sections.push(Section::new("Active Premium Users", vec![sql]));

    let recent = format!("created_at >= {}", month_ago(dialect));
    let sql = builder
        .reset()
        .select(["id", "username", "email", "created_at"])
        .from_table("users", Some("u"))
        .where_(recent)
        .build(dialect)?;
    sections.push(Section::new("New Users This Month", vec![sql]));

    let sql = builder
        .reset()
        .select(["u.username", "u.email", "COUNT(o.id) as order_count"])
        .from_table("users", Some("u"))
        .join("orders o", "u.id = o.user_id", JoinKind::Inner, None)
        .group_by(["u.id", "u.username", "u.email"])
        .build(dialect)?;
    sections.push(Section::new("Users with Orders", vec![sql]));

    Ok(Report {
        title: "User Management".into(),
        sections,
    })
}

fn month_ago(dialect: Dialect) -> String {
    match dialect {
        Dialect::Postgres => "NOW() - INTERVAL '1 month'".to_string(),
        Dialect::Sqlite => "DATETIME('now', '-1 month')".to_string(),
        Dialect::Generic | Dialect::MySql => "DATE_SUB(NOW(), INTERVAL 1 MONTH)".to_string(),
    }
}

/// Dashboard reports from custom templates.
pub fn reporting_dashboard(engine: &TemplateEngine) -> SqlVaryResult<Report> {
    let mut engine = engine.clone();
    engine.add_template(
        "daily_sales",
        "SELECT DATE($date_column) as date, SUM($amount_column) as daily_total FROM $table \
         WHERE $date_column >= DATE_SUB(NOW(), INTERVAL $days DAY) GROUP BY DATE($date_column)",
    );
    engine.add_template(
        "top_customers",
        "SELECT $customer_columns, SUM($amount_column) as total_spent FROM $table \
         GROUP BY $customer_id ORDER BY total_spent DESC LIMIT $limit",
    );
    engine.add_template(
        "product_performance",
        "SELECT p.name, p.category, SUM(oi.quantity) as units_sold, \
         SUM(oi.price * oi.quantity) as revenue FROM $products_table p \
         JOIN $order_items_table oi ON p.id = oi.product_id GROUP BY p.id ORDER BY revenue DESC",
    );

    let reports: [(&str, &str, &[(&str, &str)]); 3] = [
        (
            "Daily Sales (Last 30 Days)",
            "daily_sales",
            &[
                ("date_column", "created_at"),
                ("amount_column", "total_amount"),
                ("table", "orders"),
                ("days", "30"),
            ],
        ),
        (
            "Top 10 Customers",
            "top_customers",
            &[
                ("customer_columns", "customer_id, customer_name, customer_email"),
                ("amount_column", "total_amount"),
                ("table", "orders"),
                ("customer_id", "customer_id"),
                ("limit", "10"),
            ],
        ),
        (
            "Product Performance",
            "product_performance",
            &[
                ("products_table", "products"),
                ("order_items_table", "order_items"),
            ],
        ),
    ];

    let mut sections = Vec::new();
    for (heading, template, vars) in reports {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        sections.push(Section::new(heading, vec![engine.generate(template, &vars)?]));
    }

    Ok(Report {
        title: "Reporting Dashboard".into(),
        sections,
    })
}

/// Import and transformation statements.
pub fn data_migration(dialect: Dialect) -> SqlVaryResult<Report> {
    let generator = VariationGenerator::new(dialect);
    let import = Assignments::new()
        .with("user_id", 123)
        .with("product_name", "Wireless Headphones")
        .with("price", 99.99)
        .with("category", "Electronics")
        .with("imported_at", Value::Raw("NOW()".into()));
    let transform = Assignments::new()
        .with("normalized_name", Value::Raw("UPPER(product_name)".into()))
        .with("updated_at", Value::Raw("NOW()".into()));
    let conditions = Assignments::new().with("category", "Electronics");

    Ok(Report {
        title: "Data Migration".into(),
        sections: vec![
            Section::from_variations(
                "Data Import Queries",
                generator.insert_variations("imported_products", &import)?,
            ),
            Section::from_variations(
                "Data Transformation Queries",
                generator.update_variations("products", &transform, &conditions)?,
            ),
        ],
    })
}

/// API log analytics, first eight variations.
pub fn performance_monitoring(dialect: Dialect) -> Report {
    let config = AnalyticsConfig {
        table: "api_logs".into(),
        date_column: "timestamp".into(),
        group_columns: vec!["endpoint".into(), "method".into(), "status_code".into()],
        numeric_columns: vec!["response_time_ms".into(), "request_size_bytes".into()],
    };
    let mut queries = VariationEngine::new(dialect).analytical_variations(&config);
    queries.truncate(8);

    Report {
        title: "Performance Monitoring".into(),
        sections: vec![Section::from_variations("Performance Analytics", queries)],
    }
}

/// Every scenario, in presentation order.
pub fn all_reports(dialect: Dialect, templates: &TemplateEngine) -> SqlVaryResult<Vec<Report>> {
    Ok(vec![
        ecommerce(dialect),
        user_management(dialect)?,
        reporting_dashboard(templates)?,
        data_migration(dialect)?,
        performance_monitoring(dialect),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ecommerce_uses_comparison_fragment() {
        let report = ecommerce(Dialect::Generic);
        assert_eq!(
            report.sections[0].queries[0],
            "SELECT id, name, price, category, stock_quantity FROM products \
             WHERE active = TRUE AND stock_quantity > 0"
        );
        assert_eq!(report.sections[1].queries.len(), 6);
    }

    #[test]
    fn test_user_management() {
        let report = user_management(Dialect::MySql).unwrap();
        assert_eq!(
            report.sections[0].queries[0],
            "SELECT id, username, email, subscription_expires FROM users u \
             WHERE active = 1 AND subscription_type = 'premium'"
        );
        assert_eq!(
            report.sections[1].queries[0],
            "SELECT id, username, email, created_at FROM users u \
             WHERE created_at >= DATE_SUB(NOW(), INTERVAL 1 MONTH)"
        );
        assert_eq!(
            report.sections[2].queries[0],
            "SELECT u.username, u.email, COUNT(o.id) as order_count FROM users u \
             INNER JOIN orders o ON u.id = o.user_id GROUP BY u.id, u.username, u.email"
        );
    }

    #[test]
    fn test_reporting_dashboard() {
        let report = reporting_dashboard(&TemplateEngine::new()).unwrap();
        assert_eq!(
            report.sections[1].queries[0],
            "SELECT customer_id, customer_name, customer_email, SUM(total_amount) as total_spent \
             FROM orders GROUP BY customer_id ORDER BY total_spent DESC LIMIT 10"
        );
        assert!(report.sections[2].queries[0].contains("FROM products p JOIN order_items oi"));
    }

    #[test]
    fn test_data_migration() {
        let report = data_migration(Dialect::Generic).unwrap();
        assert_eq!(
            report.sections[0].queries[0],
            "INSERT INTO imported_products (user_id, product_name, price, category, imported_at) \
             VALUES (123, 'Wireless Headphones', 99.99, 'Electronics', NOW())"
        );
        assert_eq!(
            report.sections[1].queries[0],
            "UPDATE products SET normalized_name = UPPER(product_name), updated_at = NOW() \
             WHERE category = 'Electronics'"
        );
    }

    #[test]
    fn test_all_reports() {
        let reports = all_reports(Dialect::Sqlite, &TemplateEngine::new()).unwrap();
        assert_eq!(reports.len(), 5);
        assert_eq!(reports[4].query_count(), 8);
        let titles: Vec<&str> = reports.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "E-commerce",
                "User Management",
                "Reporting Dashboard",
                "Data Migration",
                "Performance Monitoring"
            ]
        );
    }
}
