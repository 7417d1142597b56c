//! Named SQL templates with `$name` / `${name}` placeholders.
//!
//! Substitution is lenient: placeholders without a binding are left in the
//! output exactly as written, and `$$` renders a literal `$`.
//!
//! ```
//! use std::collections::HashMap;
//! use sqlvary::template::TemplateEngine;
//!
//! let engine = TemplateEngine::new();
//! let vars = HashMap::from([
//!     ("columns".to_string(), "id, name, email".to_string()),
//!     ("table".to_string(), "users".to_string()),
//!     ("conditions".to_string(), "active = 1 AND role = 'admin'".to_string()),
//! ]);
//! let sql = engine.generate("filtered_select", &vars).unwrap();
//! assert_eq!(sql, "SELECT id, name, email FROM users WHERE active = 1 AND role = 'admin'");
//! ```

use std::collections::{BTreeMap, HashMap};

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till1, take_while, take_while1},
    character::complete::char,
    combinator::{map, recognize, value},
    sequence::{delimited, pair, preceded},
};
use tracing::debug;

use crate::error::{SqlVaryError, SqlVaryResult};

/// Templates available in every engine.
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("basic_select", "SELECT $columns FROM $table"),
    ("filtered_select", "SELECT $columns FROM $table WHERE $conditions"),
    (
        "joined_select",
        "SELECT $columns FROM $table $joins WHERE $conditions",
    ),
    (
        "aggregated_select",
        "SELECT $group_columns, $aggregates FROM $table GROUP BY $group_columns",
    ),
    (
        "paginated_select",
        "SELECT $columns FROM $table ORDER BY $order_by LIMIT $limit OFFSET $offset",
    ),
    ("basic_insert", "INSERT INTO $table ($columns) VALUES ($values)"),
    ("bulk_insert", "INSERT INTO $table ($columns) VALUES $value_sets"),
    (
        "insert_select",
        "INSERT INTO $table ($columns) SELECT $select_columns FROM $source_table WHERE $conditions",
    ),
    ("basic_update", "UPDATE $table SET $assignments WHERE $conditions"),
    (
        "joined_update",
        "UPDATE $table $joins SET $assignments WHERE $conditions",
    ),
    ("basic_delete", "DELETE FROM $table WHERE $conditions"),
    (
        "joined_delete",
        "DELETE $table FROM $table $joins WHERE $conditions",
    ),
    ("create_table", "CREATE TABLE $table ($column_definitions)"),
    ("create_index", "CREATE INDEX $index_name ON $table ($columns)"),
];

/// A piece of parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder { name: String, braced: bool },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Split text into literals and placeholders. A `$` that does not start
    /// a valid placeholder, including an unterminated `${`, is literal text.
    pub fn parse(source: &str) -> Self {
        Self {
            source: source.to_string(),
            segments: parse_segments(source),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if let Segment::Placeholder { name, .. } = seg {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute bound placeholders, leaving unbound ones untouched.
    pub fn substitute(&self, vars: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder { name, braced } => match vars.get(name) {
                    Some(v) => out.push_str(v),
                    None if *braced => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                    None => {
                        out.push('$');
                        out.push_str(name);
                    }
                },
            }
        }
        out
    }
}

/// Registry of named templates.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    templates: BTreeMap<String, Template>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Engine preloaded with [`BUILTIN_TEMPLATES`].
    pub fn new() -> Self {
        let templates = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, text)| ((*name).to_string(), Template::parse(text)))
            .collect();
        Self { templates }
    }

    /// Engine with no templates.
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Register or replace a template.
    pub fn add_template(&mut self, name: impl Into<String>, text: &str) {
        let name = name.into();
        debug!(%name, "registered template");
        self.templates.insert(name, Template::parse(text));
    }

    pub fn get(&self, name: &str) -> SqlVaryResult<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| SqlVaryError::TemplateNotFound(name.to_string()))
    }

    /// Render a named template.
    pub fn generate(&self, name: &str, vars: &HashMap<String, String>) -> SqlVaryResult<String> {
        let sql = self.get(name)?.substitute(vars);
        debug!(template = name, %sql, "generated from template");
        Ok(sql)
    }

    /// Template names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn placeholders(&self, name: &str) -> SqlVaryResult<Vec<&str>> {
        Ok(self.get(name)?.placeholders())
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn braced_placeholder(input: &str) -> IResult<&str, Segment> {
    map(delimited(tag("${"), identifier, char('}')), |name: &str| {
        Segment::Placeholder {
            name: name.to_string(),
            braced: true,
        }
    })(input)
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        value(Segment::Literal("$".to_string()), tag("$$")),
        braced_placeholder,
        map(preceded(char('$'), identifier), |name: &str| {
            Segment::Placeholder {
                name: name.to_string(),
                braced: false,
            }
        }),
        map(take_till1(|c: char| c == '$'), |s: &str| {
            Segment::Literal(s.to_string())
        }),
        // a `$` not followed by an identifier is kept as-is
        value(Segment::Literal("$".to_string()), char('$')),
    ))(input)
}

fn parse_segments(text: &str) -> Vec<Segment> {
    let mut rest = text;
    let mut segments: Vec<Segment> = Vec::new();
    while !rest.is_empty() {
        let (tail, seg) = match segment(rest) {
            Ok(parsed) => parsed,
            Err(_) => ("", Segment::Literal(rest.to_string())),
        };
        match (segments.last_mut(), seg) {
            (Some(Segment::Literal(prev)), Segment::Literal(s)) => prev.push_str(&s),
            (_, seg) => segments.push(seg),
        }
        rest = tail;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_builtin_templates_present() {
        let engine = TemplateEngine::new();
        assert_eq!(engine.names().len(), 14);
        assert!(engine.names().contains(&"create_index"));
    }

    #[test]
    fn test_safe_substitution_keeps_unbound() {
        let engine = TemplateEngine::new();
        let sql = engine
            .generate("filtered_select", &vars(&[("table", "users")]))
            .unwrap();
        assert_eq!(sql, "SELECT $columns FROM users WHERE $conditions");
    }

    #[test]
    fn test_braced_and_dollar_escape() {
        let t = Template::parse("SELECT ${col}_total, '$$5', $ FROM ${tbl}");
        let sql = t.substitute(&vars(&[("col", "amount")]));
        assert_eq!(sql, "SELECT amount_total, '$5', $ FROM ${tbl}");
    }

    #[test]
    fn test_malformed_brace_kept_verbatim() {
        let t = Template::parse("SELECT ${col FROM $table WHERE x = '${1bad}'");
        assert_eq!(t.placeholders(), vec!["table"]);
        assert_eq!(
            t.substitute(&vars(&[("col", "id"), ("table", "users")])),
            "SELECT ${col FROM users WHERE x = '${1bad}'"
        );
    }

    #[test]
    fn test_unknown_template() {
        let engine = TemplateEngine::new();
        let err = engine.generate("nope", &HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "Template 'nope' not found");
    }

    #[test]
    fn test_add_custom_template() {
        let mut engine = TemplateEngine::new();
        engine
            .add_template(
                "daily_sales",
                "SELECT DATE($date_column) as date, SUM($amount_column) as daily_total FROM $table \
                 WHERE $date_column >= DATE_SUB(NOW(), INTERVAL $days DAY) GROUP BY DATE($date_column)",
            );
        let sql = engine
            .generate(
                "daily_sales",
                &vars(&[
                    ("date_column", "created_at"),
                    ("amount_column", "total_amount"),
                    ("table", "orders"),
                    ("days", "30"),
                ]),
            )
            .unwrap();
        assert_eq!(
            sql,
            "SELECT DATE(created_at) as date, SUM(total_amount) as daily_total FROM orders \
             WHERE created_at >= DATE_SUB(NOW(), INTERVAL 30 DAY) GROUP BY DATE(created_at)"
        );
        assert_eq!(
            engine.placeholders("daily_sales").unwrap(),
            vec!["date_column", "amount_column", "table", "days"]
        );
    }

    #[test]
    fn test_placeholder_stops_at_non_identifier() {
        let t = Template::parse("$a.$b($c)");
        assert_eq!(t.placeholders(), vec!["a", "b", "c"]);
        assert_eq!(
            t.substitute(&vars(&[("a", "x"), ("b", "y"), ("c", "z")])),
            "x.y(z)"
        );
    }
}
