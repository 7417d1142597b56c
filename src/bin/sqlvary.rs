//! sqlvary CLI: SQL variation generator
//!
//! # Usage
//!
//! ```bash
//! # SELECT variations with conditions
//! sqlvary select users -c id,name,email -w active=true -w role=admin
//!
//! # CRUD families with Postgres placeholders
//! sqlvary --dialect postgres crud products -c name,price --primary-key product_id
//!
//! # Fill a template
//! sqlvary template filtered_select --var table=users --var columns=id --var "conditions=id = 1"
//!
//! # Check the reference outline
//! sqlvary lint docs/SQL_REFERENCE.md
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde::Serialize;
use sqlvary::engine::{RowMap, returns_rows};
use sqlvary::lint::LintReport;
use sqlvary::prelude::*;
use sqlvary::scenarios::{self, Report};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlvary")]
#[command(version)]
#[command(about = "Generate families of SQL statements from variables", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlvary select users -c id,name,email -w active=true
    sqlvary insert products -s name=Laptop -s price=999.99
    sqlvary --dialect postgres crud products -c name,price
    sqlvary build --table users --alias u --select u.name --where 'u.active = 1' --limit
    sqlvary lint docs/SQL_REFERENCE.md")]
struct Cli {
    /// SQL dialect (generic, postgres, mysql, sqlite)
    #[arg(short, long, global = true)]
    dialect: Option<Dialect>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Config file (defaults to <config dir>/sqlvary/config.toml)
    #[arg(long, global = true, env = "SQLVARY_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// SELECT variations
    Select {
        table: String,
        /// Columns to select
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,
        /// Equality condition, key=value (repeatable)
        #[arg(short = 'w', long = "where")]
        conditions: Vec<String>,
    },
    /// INSERT variations
    Insert {
        table: String,
        /// Column value, key=value (repeatable)
        #[arg(short, long = "set", required = true)]
        set: Vec<String>,
    },
    /// UPDATE variations
    Update {
        table: String,
        #[arg(short, long = "set", required = true)]
        set: Vec<String>,
        #[arg(short = 'w', long = "where")]
        conditions: Vec<String>,
    },
    /// DELETE variations
    Delete {
        table: String,
        #[arg(short = 'w', long = "where")]
        conditions: Vec<String>,
    },
    /// Grouped aggregates and window functions over one column pair
    Analytics {
        table: String,
        #[arg(short, long)]
        group: String,
        #[arg(short, long)]
        aggregate: String,
    },
    /// CRUD families with placeholders
    Crud {
        table: String,
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,
        #[arg(long, default_value = "id")]
        primary_key: String,
    },
    /// Time, grouping, numeric and window analytics from column lists
    Analyze {
        table: String,
        #[arg(long, default_value = "created_at")]
        date_column: String,
        #[arg(short, long, value_delimiter = ',')]
        group: Vec<String>,
        #[arg(short, long, value_delimiter = ',')]
        numeric: Vec<String>,
    },
    /// JOIN variations
    Joins {
        /// Main table (ignored with --spec)
        main_table: Option<String>,
        /// Join as table|on|kind (kind defaults to inner)
        #[arg(short, long)]
        join: Vec<String>,
        /// JSON file with {"main_table": ..., "joins": [...]}
        #[arg(long, conflicts_with_all = ["main_table", "join"])]
        spec: Option<PathBuf>,
    },
    /// Fill a named template
    Template {
        name: Option<String>,
        /// Template variable, key=value (repeatable)
        #[arg(long = "var")]
        vars: Vec<String>,
        /// List templates and their placeholders
        #[arg(short, long)]
        list: bool,
    },
    /// Build one statement from clauses
    Build {
        #[arg(short, long)]
        table: Option<String>,
        #[arg(long)]
        alias: Option<String>,
        #[arg(short, long)]
        select: Vec<String>,
        /// Join as table|on|kind
        #[arg(short, long)]
        join: Vec<String>,
        #[arg(short = 'w', long = "where")]
        conditions: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        group_by: Vec<String>,
        #[arg(long)]
        having: Vec<String>,
        /// column or column:desc
        #[arg(long)]
        order_by: Vec<String>,
        /// LIMIT; without a value the configured default is used
        #[arg(long, num_args = 0..=1)]
        limit: Option<Option<u64>>,
        #[arg(long, requires = "limit")]
        offset: Option<u64>,
    },
    /// Print the canned scenario reports
    Demo {
        /// Only the report whose title contains this text
        #[arg(long)]
        only: Option<String>,
    },
    /// Check Markdown documents
    Lint {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Fail on warnings too
        #[arg(long)]
        strict: bool,
    },
    /// Run statements against a database
    Exec {
        #[arg(required = true)]
        statements: Vec<String>,
        /// Parameter bindings for every statement ($1/? order)
        #[arg(short, long, value_delimiter = ',')]
        bind: Vec<String>,
        #[arg(long, env = "SQLVARY_DATABASE_URL")]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sqlvary=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("loading config")?;
    let dialect = cli.dialect.unwrap_or(config.dialect);
    let format = cli.format;
    debug!(%dialect, "starting");

    match cli.command {
        Commands::Select {
            table,
            columns,
            conditions,
        } => {
            let conditions = Assignments::parse_pairs(&conditions)?;
            let out = VariationGenerator::new(dialect).select_variations(&table, &columns, &conditions);
            print_variations("SELECT Variations", &out, format)
        }
        Commands::Insert { table, set } => {
            let data = Assignments::parse_pairs(&set)?;
            let out = VariationGenerator::new(dialect).insert_variations(&table, &data)?;
            print_variations("INSERT Variations", &out, format)
        }
        Commands::Update {
            table,
            set,
            conditions,
        } => {
            let data = Assignments::parse_pairs(&set)?;
            let conditions = Assignments::parse_pairs(&conditions)?;
            let out = VariationGenerator::new(dialect).update_variations(&table, &data, &conditions)?;
            print_variations("UPDATE Variations", &out, format)
        }
        Commands::Delete { table, conditions } => {
            let conditions = Assignments::parse_pairs(&conditions)?;
            let out = VariationGenerator::new(dialect).delete_variations(&table, &conditions);
            print_variations("DELETE Variations", &out, format)
        }
        Commands::Analytics {
            table,
            group,
            aggregate,
        } => {
            let out = VariationGenerator::new(dialect).analytical_queries(&table, &group, &aggregate);
            print_variations("Analytical Variations", &out, format)
        }
        Commands::Crud {
            table,
            columns,
            primary_key,
        } => {
            let config = CrudConfig::new(table).columns(columns).primary_key(primary_key);
            let out = VariationEngine::new(dialect).crud_variations(&config);
            match format {
                OutputFormat::Json => print_json(&out),
                OutputFormat::Text => {
                    for (op, family) in out.iter() {
                        print_variations(&format!("{} Queries", op.to_uppercase()), family, format)?;
                    }
                    Ok(())
                }
            }
        }
        Commands::Analyze {
            table,
            date_column,
            group,
            numeric,
        } => {
            let config = AnalyticsConfig {
                table,
                date_column,
                group_columns: group,
                numeric_columns: numeric,
            };
            let out = VariationEngine::new(dialect).analytical_variations(&config);
            print_variations("Analytics", &out, format)
        }
        Commands::Joins {
            main_table,
            join,
            spec,
        } => {
            let spec = match spec {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str::<JoinSpec>(&text)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => {
                    let Some(main_table) = main_table else {
                        bail!("a main table or --spec is required");
                    };
                    let joins = join
                        .iter()
                        .map(|j| parse_join(j))
                        .collect::<Result<Vec<_>>>()?;
                    JoinSpec { main_table, joins }
                }
            };
            let out = VariationEngine::new(dialect).join_variations(&spec);
            print_variations("JOIN Variations", &out, format)
        }
        Commands::Template { name, vars, list } => {
            let engine = config.template_engine();
            if list || name.is_none() {
                return list_templates(&engine, format);
            }
            let name = name.unwrap_or_default();
            let vars = parse_vars(&vars)?;
            let sql = engine.generate(&name, &vars)?;
            match format {
                OutputFormat::Json => print_json(&Variation::new(name, sql)),
                OutputFormat::Text => {
                    println!("{}", sql);
                    Ok(())
                }
            }
        }
        Commands::Build {
            table,
            alias,
            select,
            join,
            conditions,
            group_by,
            having,
            order_by,
            limit,
            offset,
        } => {
            let mut builder = QueryBuilder::new();
            builder.select(select).group_by(group_by);
            if let Some(table) = table {
                builder.from_table(table, alias.as_deref());
            }
            for j in &join {
                let target = parse_join(j)?;
                builder.join(target.table, target.on, target.kind, None);
            }
            for c in conditions {
                builder.where_(c);
            }
            for h in having {
                builder.having(h);
            }
            for o in &order_by {
                let (col, dir) = match o.rsplit_once(':') {
                    Some((col, dir)) => (col, dir.parse::<SortOrder>()?),
                    None => (o.as_str(), SortOrder::Asc),
                };
                builder.order_by(col, dir);
            }
            if let Some(limit) = limit {
                builder.limit(limit.unwrap_or(config.default_limit), offset);
            }
            let sql = builder.build(dialect)?;
            match format {
                OutputFormat::Json => print_json(&Variation::new("build", sql)),
                OutputFormat::Text => {
                    println!("{}", sql);
                    Ok(())
                }
            }
        }
        Commands::Demo { only } => {
            let engine = config.template_engine();
            let mut reports = scenarios::all_reports(dialect, &engine)?;
            if let Some(only) = only {
                let needle = only.to_lowercase();
                reports.retain(|r| r.title.to_lowercase().contains(&needle));
                if reports.is_empty() {
                    bail!("no scenario matches '{}'", only);
                }
            }
            match format {
                OutputFormat::Json => print_json(&reports),
                OutputFormat::Text => {
                    for report in &reports {
                        print_report(report);
                    }
                    Ok(())
                }
            }
        }
        Commands::Lint { paths, strict } => {
            let mut reports = Vec::with_capacity(paths.len());
            for path in &paths {
                reports.push(lint_file(path).with_context(|| format!("linting {}", path.display()))?);
            }
            match format {
                OutputFormat::Json => print_json(&reports)?,
                OutputFormat::Text => reports.iter().for_each(print_lint_report),
            }
            let failed = reports
                .iter()
                .any(|r| r.has_errors() || (strict && r.has_warnings()));
            if failed {
                bail!("lint failed");
            }
            Ok(())
        }
        Commands::Exec {
            statements,
            bind,
            database_url,
        } => {
            let Some(url) = database_url.or(config.database_url) else {
                bail!("No database URL. Use --database-url or set SQLVARY_DATABASE_URL");
            };
            let bindings: Vec<Value> = bind.iter().map(|b| Value::infer(b)).collect();
            let runner = SqlRunner::connect(&url).await?;
            for sql in &statements {
                if cli.verbose {
                    println!("{} {}", "Running:".dimmed(), sql.yellow());
                }
                if returns_rows(sql) {
                    let rows = runner.fetch_all(sql, &bindings).await?;
                    match format {
                        OutputFormat::Json => print_json(&rows)?,
                        OutputFormat::Text => print_rows(&rows),
                    }
                } else {
                    let affected = runner.execute(sql, &bindings).await?;
                    println!("{} {} rows affected", "✓".green(), affected);
                }
            }
            Ok(())
        }
    }
}

/// Parse `table|on|kind`.
fn parse_join(raw: &str) -> Result<JoinTarget> {
    let mut parts = raw.split('|').map(str::trim);
    let table = parts.next().filter(|s| !s.is_empty());
    let on = parts.next().filter(|s| !s.is_empty());
    let (Some(table), Some(on)) = (table, on) else {
        bail!("invalid join '{}', expected table|on|kind", raw);
    };
    let kind = match parts.next() {
        Some(k) if !k.is_empty() => k.parse::<JoinKind>()?,
        _ => JoinKind::Inner,
    };
    Ok(JoinTarget {
        table: table.to_string(),
        on: on.to_string(),
        kind,
    })
}

fn parse_vars(items: &[String]) -> Result<HashMap<String, String>> {
    items
        .iter()
        .map(|item| {
            item.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| anyhow::Error::from(SqlVaryError::InvalidAssignment(item.clone())))
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_variations(title: &str, variations: &[Variation], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(variations),
        OutputFormat::Text => {
            println!("{}", format!("=== {} ===", title).cyan().bold());
            if variations.is_empty() {
                println!("{}", "(none)".dimmed());
            }
            for (i, v) in variations.iter().enumerate() {
                println!("{:>3}. {} {}", i + 1, v.sql.white(), format!("[{}]", v.label).dimmed());
            }
            println!();
            Ok(())
        }
    }
}

fn print_report(report: &Report) {
    println!("{}", report.title.to_uppercase().cyan().bold());
    println!("{}", "=".repeat(50).dimmed());
    for section in &report.sections {
        println!();
        println!("{}", section.heading.green().bold());
        for query in &section.queries {
            println!("  • {}", query);
        }
    }
    println!();
}

fn list_templates(engine: &TemplateEngine, format: OutputFormat) -> Result<()> {
    #[derive(Serialize)]
    struct Entry<'a> {
        name: &'a str,
        placeholders: Vec<&'a str>,
        source: &'a str,
    }

    let mut entries = Vec::new();
    for name in engine.names() {
        let template = engine.get(name)?;
        entries.push(Entry {
            name,
            placeholders: template.placeholders(),
            source: template.source(),
        });
    }

    match format {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Text => {
            println!(
                "{:20} {}",
                "Template".white().bold(),
                "Placeholders".white().bold()
            );
            println!("{}", "─".repeat(80).dimmed());
            for e in &entries {
                println!("{:20} {}", e.name.cyan(), e.placeholders.join(", ").dimmed());
            }
            Ok(())
        }
    }
}

fn print_lint_report(report: &LintReport) {
    println!("{} {}", "Linting:".dimmed(), report.path.display().to_string().yellow());
    if report.is_clean() {
        println!("  {} no issues", "✓".green());
        return;
    }
    for issue in &report.issues {
        let level = match issue.level {
            LintLevel::Error => "error".red().bold(),
            LintLevel::Warning => "warning".yellow().bold(),
            LintLevel::Info => "info".blue(),
        };
        println!("  {}:{} {} {}", report.path.display(), issue.line, level, issue.message);
        if let Some(s) = &issue.suggestion {
            println!("      {} {}", "→".dimmed(), s.dimmed());
        }
    }
    println!(
        "  {} error(s), {} warning(s), {} info",
        report.count(LintLevel::Error),
        report.count(LintLevel::Warning),
        report.count(LintLevel::Info)
    );
}

fn print_rows(results: &[RowMap]) {
    if results.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    let mut columns: Vec<&String> = results[0].keys().collect();
    columns.sort();

    let mut widths: HashMap<&String, usize> = columns.iter().map(|c| (*c, c.len())).collect();
    for row in results {
        for (col, val) in row {
            let len = val_to_string(val).len();
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(len);
            }
        }
    }

    let header: Vec<String> = columns
        .iter()
        .map(|c| format!("{:width$}", c, width = widths[*c]))
        .collect();
    println!("{}", header.join(" │ ").white().bold());

    let sep: Vec<String> = columns.iter().map(|c| "─".repeat(widths[*c])).collect();
    println!("{}", sep.join("─┼─").dimmed());

    for row in results {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| {
                let val = row.get(*c).map(val_to_string).unwrap_or_default();
                format!("{:width$}", val, width = widths[*c])
            })
            .collect();
        println!("{}", cells.join(" │ "));
    }

    println!();
    println!("{} row(s) returned", results.len().to_string().cyan());
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => val.to_string(),
    }
}
