//! Markdown checks for the SQL reference outline.
//!
//! The outline is pure content; these checks only guard the structure a
//! renderer relies on: balanced code fences, heading levels that step down
//! one at a time, and list nesting that steps in one level at a time.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::SqlVaryResult;

/// Lint severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for LintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LintLevel::Error => "error",
            LintLevel::Warning => "warning",
            LintLevel::Info => "info",
        };
        write!(f, "{}", s)
    }
}

/// A lint issue found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub level: LintLevel,
    /// 1-based line number.
    pub line: usize,
    pub message: String,
    pub suggestion: Option<String>,
}

impl LintIssue {
    fn new(level: LintLevel, line: usize, message: impl Into<String>) -> Self {
        Self {
            level,
            line,
            message: message.into(),
            suggestion: None,
        }
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// All issues found in one file.
#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    pub path: PathBuf,
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        self.count(LintLevel::Error) > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.count(LintLevel::Warning) > 0
    }

    pub fn count(&self, level: LintLevel) -> usize {
        self.issues.iter().filter(|i| i.level == level).count()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Width of one list nesting step.
const LIST_STEP: usize = 4;

struct OpenFence {
    line: usize,
    marker: char,
    len: usize,
}

/// Check Markdown text.
pub fn lint_markdown(content: &str) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let mut fence: Option<OpenFence> = None;
    let mut last_heading: Option<usize> = None;
    let mut last_list_indent: Option<usize> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let indent = indent_width(raw);
        let trimmed = raw.trim_start();

        if let Some((marker, len)) = fence_marker(trimmed) {
            match &fence {
                Some(open) => {
                    let rest = trimmed.trim_start_matches(marker);
                    if marker == open.marker && len >= open.len && rest.trim().is_empty() {
                        fence = None;
                    }
                }
                None => {
                    fence = Some(OpenFence {
                        line: line_no,
                        marker,
                        len,
                    });
                }
            }
            continue;
        }
        if fence.is_some() {
            continue;
        }

        if let Some(level) = heading_level(trimmed).filter(|_| indent < 4) {
            let text = trimmed[level..].trim().trim_end_matches('#').trim();
            if text.is_empty() {
                issues.push(
                    LintIssue::new(LintLevel::Warning, line_no, "Heading has no text")
                        .suggest("Give the heading a title or remove it"),
                );
            }
            if let Some(prev) = last_heading {
                if level > prev + 1 {
                    issues.push(
                        LintIssue::new(
                            LintLevel::Info,
                            line_no,
                            format!("Heading level jumps from h{} to h{}", prev, level),
                        )
                        .suggest(format!("Use h{} here", prev + 1)),
                    );
                }
            }
            last_heading = Some(level);
            last_list_indent = None;
            continue;
        }

        if is_list_item(trimmed) {
            let allowed = last_list_indent.map(|p| p + LIST_STEP).unwrap_or(LIST_STEP - 1);
            if indent > allowed {
                issues.push(
                    LintIssue::new(
                        LintLevel::Warning,
                        line_no,
                        format!("List item indented {} columns, skipping a nesting level", indent),
                    )
                    .suggest(format!("Indent by at most {} columns", allowed)),
                );
            }
            last_list_indent = Some(indent);
        }
    }

    if let Some(open) = fence {
        issues.push(
            LintIssue::new(
                LintLevel::Error,
                open.line,
                "Fenced code block is never closed",
            )
            .suggest(format!(
                "Add a closing {} line",
                open.marker.to_string().repeat(open.len)
            )),
        );
    }

    issues.sort_by_key(|i| (i.line, i.level));
    issues
}

/// Check a Markdown file.
pub fn lint_file(path: impl AsRef<Path>) -> SqlVaryResult<LintReport> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let issues = lint_markdown(&content);
    debug!(path = %path.display(), issues = issues.len(), "linted");
    Ok(LintReport {
        path: path.to_path_buf(),
        issues,
    })
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}

/// Fence character and run length if the line opens or closes a fence.
fn fence_marker(trimmed: &str) -> Option<(char, usize)> {
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some((marker, len))
}

fn heading_level(trimmed: &str) -> Option<usize> {
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    match trimmed[level..].chars().next() {
        None | Some(' ') | Some('\t') => Some(level),
        _ => None,
    }
}

/// `***`, `- - -`, `___`: three or more of one marker, nothing else but
/// spaces and tabs.
fn is_thematic_break(trimmed: &str) -> bool {
    let Some(marker) = trimmed.chars().next().filter(|c| matches!(c, '-' | '*' | '_')) else {
        return false;
    };
    let mut count = 0;
    for c in trimmed.chars() {
        match c {
            c if c == marker => count += 1,
            ' ' | '\t' => {}
            _ => return false,
        }
    }
    count >= 3
}

fn is_list_item(trimmed: &str) -> bool {
    if is_thematic_break(trimmed) {
        return false;
    }
    let mut chars = trimmed.chars();
    match chars.next() {
        Some('-' | '*' | '+') => matches!(chars.next(), None | Some(' ' | '\t')),
        Some(c) if c.is_ascii_digit() => {
            let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
            let rest = trimmed[digits..].trim_end();
            let marked = matches!(rest, "." | ")") || rest.starts_with(". ") || rest.starts_with(") ");
            marked && digits <= 9
        }
        _ => false,
    }
}
