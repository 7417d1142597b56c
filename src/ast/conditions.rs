use crate::ast::{Assignments, Value};
use crate::dialect::Dialect;

/// Operator prefixes that mark loosely typed input as a comparison fragment,
/// e.g. `"> 0"` for `stock_quantity > 0`.
const OPERATOR_PREFIXES: &[&str] = &["<=", ">=", "<>", "!=", "<", ">", "="];

/// Keyword prefixes, matched only in upper case.
const KEYWORD_PREFIXES: &[&str] = &[
    "LIKE ", "NOT LIKE ", "IN (", "NOT IN (", "IS ", "BETWEEN ",
];

/// Whether text typed as a condition value is a comparison fragment.
pub(crate) fn is_comparison_fragment(s: &str) -> bool {
    let s = s.trim_start();
    OPERATOR_PREFIXES.iter().any(|p| s.starts_with(p))
        || KEYWORD_PREFIXES.iter().any(|p| s.starts_with(p))
}

/// Render `column = value`, `column IS NULL`, or `column <fragment>` for a
/// [`Value::Condition`].
pub fn condition_sql(column: &str, value: &Value, dialect: Dialect) -> String {
    match value {
        Value::Null => format!("{} IS NULL", column),
        Value::Condition(fragment) => format!("{} {}", column, fragment.trim()),
        v => format!("{} = {}", column, v.to_sql(dialect)),
    }
}

/// All conditions joined with ` AND `.
pub fn where_clause(conditions: &Assignments, dialect: Dialect) -> String {
    conditions
        .iter()
        .map(|(c, v)| condition_sql(c, v, dialect))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// `col = value` pairs joined with `, `, for UPDATE ... SET.
pub fn set_clause(data: &Assignments, dialect: Dialect) -> String {
    data.iter()
        .map(|(c, v)| format!("{} = {}", c, v.to_sql(dialect)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality() {
        let sql = condition_sql("role", &Value::from("admin"), Dialect::Generic);
        assert_eq!(sql, "role = 'admin'");
    }

    #[test]
    fn test_comparison_fragment() {
        let sql = condition_sql("stock_quantity", &Value::infer("> 0"), Dialect::Generic);
        assert_eq!(sql, "stock_quantity > 0");
        let sql = condition_sql("created_at", &Value::infer("< '2024-01-01'"), Dialect::Generic);
        assert_eq!(sql, "created_at < '2024-01-01'");
        let sql = condition_sql("id", &Value::infer("IN (1, 2)"), Dialect::Generic);
        assert_eq!(sql, "id IN (1, 2)");
    }

    #[test]
    fn test_text_is_always_quoted() {
        let sql = condition_sql("title", &Value::from("Is it O'Brien?"), Dialect::Generic);
        assert_eq!(sql, "title = 'Is it O''Brien?'");
        let sql = condition_sql("name", &Value::from("= '' OR 1=1 --"), Dialect::Generic);
        assert_eq!(sql, "name = '= '''' OR 1=1 --'");
        let sql = condition_sql("status", &Value::from("In (progress)"), Dialect::Generic);
        assert_eq!(sql, "status = 'In (progress)'");
    }

    #[test]
    fn test_mixed_case_keywords_are_text() {
        assert_eq!(Value::infer("Is it"), Value::Text("Is it".into()));
        assert_eq!(Value::infer("In (progress)"), Value::Text("In (progress)".into()));
        assert_eq!(Value::infer("IS NOT NULL"), Value::Condition("IS NOT NULL".into()));
    }

    #[test]
    fn test_null_condition() {
        assert_eq!(
            condition_sql("deleted_at", &Value::Null, Dialect::Generic),
            "deleted_at IS NULL"
        );
    }

    #[test]
    fn test_where_and_set_clauses() {
        let conds = Assignments::new().with("active", true).with("role", "admin");
        assert_eq!(
            where_clause(&conds, Dialect::Sqlite),
            "active = 1 AND role = 'admin'"
        );
        let data = Assignments::new()
            .with("status", "shipped")
            .with("updated_at", Value::Raw("NOW()".into()));
        assert_eq!(
            set_clause(&data, Dialect::Generic),
            "status = 'shipped', updated_at = NOW()"
        );
    }
}
