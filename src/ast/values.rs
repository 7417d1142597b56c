use chrono::{NaiveDate, NaiveDateTime};
use crate::ast::conditions::is_comparison_fragment;
use crate::dialect::Dialect;

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A literal value bound to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Calendar date, rendered as a quoted ISO date
    Date(NaiveDate),
    /// Date and time, rendered as a quoted ISO timestamp
    Timestamp(NaiveDateTime),
    /// Text, rendered single-quoted
    Text(String),
    /// SQL expression emitted verbatim (e.g. `NOW()`, `UPPER(name)`)
    Raw(String),
    /// Positional parameter, rendered with the dialect's placeholder
    Param(usize),
    /// Comparison fragment such as `> 0` or `IN (1, 2)`, only produced by
    /// [`Value::infer`]. In WHERE clauses it renders as `column <fragment>`;
    /// anywhere else it is quoted like text.
    Condition(String),
}

impl Value {
    /// Infer a value from loosely typed text (CLI arguments, config files).
    ///
    /// Function-call shaped text such as `NOW()` becomes [`Value::Raw`];
    /// `$n` becomes a parameter.
    pub fn infer(input: &str) -> Value {
        let s = input.trim();
        if s.eq_ignore_ascii_case("null") {
            return Value::Null;
        }
        if s.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        if let Some(n) = s.strip_prefix('$').and_then(|n| n.parse::<usize>().ok()) {
            return Value::Param(n);
        }
        if looks_numeric(s) {
            if let Ok(n) = s.parse::<i64>() {
                return Value::Int(n);
            }
            if let Some(f) = s.parse::<f64>().ok().filter(|f| f.is_finite()) {
                return Value::Float(f);
            }
        }
        for fmt in TIMESTAMP_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
                return Value::Timestamp(ts);
            }
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Value::Date(d);
        }
        if is_function_call(s) {
            return Value::Raw(s.to_string());
        }
        if is_comparison_fragment(s) {
            return Value::Condition(s.to_string());
        }
        Value::Text(input.to_string())
    }

    /// Render as a SQL literal for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => dialect.bool_literal(*b),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => format!("{:?}", f),
            Value::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
            Value::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::Text(s) | Value::Condition(s) => quote_literal(s),
            Value::Raw(s) => s.clone(),
            Value::Param(n) => dialect.placeholder(*n),
        }
    }
}

/// Single-quote a string literal, doubling embedded quotes.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Number-shaped text that round-trips through a SQL number. A leading `+`
/// or a leading zero (`01234`, but not `0` or `0.5`) keeps the text as-is,
/// as for phone numbers and zip codes.
fn looks_numeric(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut chars = digits.chars();
    let leading_zero = chars.next() == Some('0') && chars.next().is_some_and(|c| c.is_ascii_digit());
    !digits.is_empty()
        && !digits.starts_with('+')
        && !leading_zero
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

/// `IDENT(...)` with balanced outer parentheses.
fn is_function_call(s: &str) -> bool {
    let Some(open) = s.find('(') else {
        return false;
    };
    let name = &s[..open];
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !starts_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    if !s.ends_with(')') {
        return false;
    }
    let mut depth = 0i32;
    for (i, c) in s[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && open + i != s.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_scalars() {
        assert_eq!(Value::infer("42"), Value::Int(42));
        assert_eq!(Value::infer("-7"), Value::Int(-7));
        assert_eq!(Value::infer("999.99"), Value::Float(999.99));
        assert_eq!(Value::infer("TRUE"), Value::Bool(true));
        assert_eq!(Value::infer("null"), Value::Null);
        assert_eq!(Value::infer("$2"), Value::Param(2));
    }

    #[test]
    fn test_infer_text_not_numeric() {
        assert_eq!(Value::infer("inf"), Value::Text("inf".into()));
        assert_eq!(Value::infer("e"), Value::Text("e".into()));
        assert_eq!(Value::infer("Laptop"), Value::Text("Laptop".into()));
    }

    #[test]
    fn test_infer_keeps_number_like_text() {
        assert_eq!(Value::infer("01234"), Value::Text("01234".into()));
        assert_eq!(Value::infer("01234").to_sql(Dialect::Generic), "'01234'");
        assert_eq!(Value::infer("+15551234"), Value::Text("+15551234".into()));
        assert_eq!(Value::infer("-007"), Value::Text("-007".into()));
        assert_eq!(Value::infer("0"), Value::Int(0));
        assert_eq!(Value::infer("0.5"), Value::Float(0.5));
        assert_eq!(Value::infer("-0.25"), Value::Float(-0.25));
    }

    #[test]
    fn test_infer_rejects_non_finite_floats() {
        assert_eq!(Value::infer("1e999"), Value::Text("1e999".into()));
        assert_eq!(Value::infer("1e999").to_sql(Dialect::Generic), "'1e999'");
        assert_eq!(Value::infer("1e3"), Value::Float(1000.0));
    }

    #[test]
    fn test_infer_dates() {
        assert_eq!(
            Value::infer("2024-01-01"),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        let ts = Value::infer("2024-01-01T10:30:00");
        assert_eq!(ts.to_sql(Dialect::Generic), "'2024-01-01 10:30:00'");
    }

    #[test]
    fn test_infer_function_calls() {
        assert_eq!(Value::infer("NOW()"), Value::Raw("NOW()".into()));
        assert_eq!(
            Value::infer("UPPER(product_name)"),
            Value::Raw("UPPER(product_name)".into())
        );
        // Two calls side by side are not a single expression.
        assert_eq!(Value::infer("f(a) (b)"), Value::Text("f(a) (b)".into()));
        assert_eq!(Value::infer("(x)"), Value::Text("(x)".into()));
    }

    #[test]
    fn test_to_sql_escapes_quotes() {
        let v = Value::from("O'Brien");
        assert_eq!(v.to_sql(Dialect::Generic), "'O''Brien'");
    }

    #[test]
    fn test_to_sql_dialect_dependent() {
        assert_eq!(Value::Bool(true).to_sql(Dialect::MySql), "1");
        assert_eq!(Value::Bool(true).to_sql(Dialect::Postgres), "TRUE");
        assert_eq!(Value::Param(3).to_sql(Dialect::Postgres), "$3");
        assert_eq!(Value::Param(3).to_sql(Dialect::Sqlite), "?");
        assert_eq!(Value::Float(1.0).to_sql(Dialect::Generic), "1.0");
    }
}
