//! Conditional and arithmetic expressions
//!
//! The delivery service accepts expressions in a compact token grammar
//! (`w_gt_100_and_ar_lt_1.5`). This module converts human friendly input
//! (`width > 100 && aspect_ratio < 1.5`) into that grammar and offers a small
//! fluent builder for composing expressions term by term.
//!
//! ```
//! use cloudinary::expression::{normalize, Expression};
//!
//! assert_eq!(normalize("width > 100 && faceCount < 2"), "w_gt_100_and_fc_lt_2");
//!
//! let condition = Expression::condition().width().gt(5).and().height().lt(10);
//! assert_eq!(condition.to_string(), "w_gt_5_and_h_lt_10");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Operator literals and their short codes
const OPERATORS: &[(&str, &str)] = &[
    ("=", "eq"),
    ("!=", "ne"),
    ("<", "lt"),
    (">", "gt"),
    ("<=", "lte"),
    (">=", "gte"),
    ("&&", "and"),
    ("||", "or"),
    ("*", "mul"),
    ("/", "div"),
    ("+", "add"),
    ("-", "sub"),
    ("^", "pow"),
];

/// Predefined variable names (snake_case and camelCase) and their short codes
const PREDEFINED_VARS: &[(&str, &str)] = &[
    ("width", "w"),
    ("height", "h"),
    ("initial_width", "iw"),
    ("initialWidth", "iw"),
    ("initial_height", "ih"),
    ("initialHeight", "ih"),
    ("aspect_ratio", "ar"),
    ("aspectRatio", "ar"),
    ("initial_aspect_ratio", "iar"),
    ("initialAspectRatio", "iar"),
    ("page_count", "pc"),
    ("pageCount", "pc"),
    ("face_count", "fc"),
    ("faceCount", "fc"),
    ("current_page", "cp"),
    ("currentPage", "cp"),
    ("page_x", "px"),
    ("pageX", "px"),
    ("page_y", "py"),
    ("pageY", "py"),
    ("illustration_score", "ils"),
    ("illustrationScore", "ils"),
    ("duration", "du"),
    ("initial_duration", "idu"),
    ("initialDuration", "idu"),
    ("tags", "tags"),
];

static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

static SEPARATOR_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Reverse-lexicographic alternation so `>=` is tried before `>`.
fn alternation(entries: &[(&str, &str)]) -> String {
    let mut keys: Vec<&str> = entries.iter().map(|(k, _)| *k).collect();
    keys.sort_unstable_by(|a, b| b.cmp(a));
    keys.iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|")
}

/// Gets the compiled token pattern.
///
/// Group 1 swallows a user variable name (`$name`, no underscores) so it is
/// never rewritten, group 2 is an operator that must be followed by a separator (group 3),
/// group 4 is a predefined variable name.
fn token_pattern() -> &'static Regex {
    TOKEN_PATTERN.get_or_init(|| {
        let pattern = format!(
            r"(\$[A-Za-z][A-Za-z0-9]*)|({})(_)|({})",
            alternation(OPERATORS),
            alternation(PREDEFINED_VARS)
        );
        Regex::new(&pattern).expect("Invalid expression regex - this is a compile-time bug")
    })
}

fn separator_pattern() -> &'static Regex {
    SEPARATOR_PATTERN.get_or_init(|| {
        Regex::new(r"[ _]+").expect("Invalid separator regex - this is a compile-time bug")
    })
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Normalize a human readable expression into the server token grammar
///
/// Runs of spaces and underscores collapse to one underscore, then every
/// operator followed by a separator and every predefined variable name is
/// replaced by its short code. Anything else passes through unchanged, and
/// quoted literals (`!text!`) are returned verbatim.
pub fn normalize(expression: &str) -> String {
    if expression.len() > 2 && expression.starts_with('!') && expression.ends_with('!') {
        return expression.to_string();
    }

    let collapsed = separator_pattern().replace_all(expression, "_");

    token_pattern()
        .replace_all(&collapsed, |caps: &regex::Captures| {
            if let Some(user_var) = caps.get(1) {
                return user_var.as_str().to_string();
            }
            if let (Some(op), Some(sep)) = (caps.get(2), caps.get(3)) {
                let code = lookup(OPERATORS, op.as_str()).unwrap_or(op.as_str());
                return format!("{}{}", code, sep.as_str());
            }
            let name = caps.get(4).map(|m| m.as_str()).unwrap_or_default();
            lookup(PREDEFINED_VARS, name).unwrap_or(name).to_string()
        })
        .into_owned()
}

/// Whether an expression is used as a plain value or as an `if` condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpressionKind {
    #[default]
    Expression,
    Condition,
}

/// Fluent expression builder
///
/// Terms are appended in call order and joined with `_` on rendering.
/// A `Condition` renders identically; the kind only tells the
/// transformation compiler to emit it under the `if` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expression {
    kind: ExpressionKind,
    terms: Vec<String>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condition() -> Self {
        Self {
            kind: ExpressionKind::Condition,
            terms: Vec::new(),
        }
    }

    /// Start from a raw human readable expression
    pub fn parse(raw: &str) -> Self {
        let mut expression = Self::new();
        expression.terms.push(normalize(raw));
        expression
    }

    pub fn kind(&self) -> ExpressionKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn push(mut self, term: impl Into<String>) -> Self {
        self.terms.push(term.into());
        self
    }

    fn push_op(self, code: &str, value: impl fmt::Display) -> Self {
        self.push(code).value(value)
    }

    /// Append an arbitrary value; strings are normalized
    pub fn value(self, value: impl fmt::Display) -> Self {
        let rendered = normalize(&value.to_string());
        self.push(rendered)
    }

    /// Append a user defined variable reference (`$name`)
    pub fn variable(self, name: &str) -> Self {
        let name = name.trim_start_matches('$');
        self.push(format!("${}", name))
    }

    /// `<variable> <operator> <value>` in one call, e.g. `predicate("width", ">", 100)`
    pub fn predicate(self, name: &str, operator: &str, value: impl fmt::Display) -> Self {
        let name = lookup(PREDEFINED_VARS, name).unwrap_or(name).to_string();
        let operator = lookup(OPERATORS, operator).unwrap_or(operator).to_string();
        self.push(name).push(operator).value(value)
    }

    // === Predefined variables ===

    pub fn width(self) -> Self {
        self.push("w")
    }

    pub fn height(self) -> Self {
        self.push("h")
    }

    pub fn initial_width(self) -> Self {
        self.push("iw")
    }

    pub fn initial_height(self) -> Self {
        self.push("ih")
    }

    pub fn aspect_ratio(self) -> Self {
        self.push("ar")
    }

    pub fn initial_aspect_ratio(self) -> Self {
        self.push("iar")
    }

    pub fn page_count(self) -> Self {
        self.push("pc")
    }

    pub fn face_count(self) -> Self {
        self.push("fc")
    }

    pub fn current_page(self) -> Self {
        self.push("cp")
    }

    pub fn tags(self) -> Self {
        self.push("tags")
    }

    pub fn page_x(self) -> Self {
        self.push("px")
    }

    pub fn page_y(self) -> Self {
        self.push("py")
    }

    pub fn duration(self) -> Self {
        self.push("du")
    }

    pub fn initial_duration(self) -> Self {
        self.push("idu")
    }

    // === Operators ===

    pub fn eq(self, value: impl fmt::Display) -> Self {
        self.push_op("eq", value)
    }

    pub fn ne(self, value: impl fmt::Display) -> Self {
        self.push_op("ne", value)
    }

    pub fn lt(self, value: impl fmt::Display) -> Self {
        self.push_op("lt", value)
    }

    pub fn lte(self, value: impl fmt::Display) -> Self {
        self.push_op("lte", value)
    }

    pub fn gt(self, value: impl fmt::Display) -> Self {
        self.push_op("gt", value)
    }

    pub fn gte(self, value: impl fmt::Display) -> Self {
        self.push_op("gte", value)
    }

    pub fn mul(self, value: impl fmt::Display) -> Self {
        self.push_op("mul", value)
    }

    pub fn div(self, value: impl fmt::Display) -> Self {
        self.push_op("div", value)
    }

    pub fn add(self, value: impl fmt::Display) -> Self {
        self.push_op("add", value)
    }

    pub fn sub(self, value: impl fmt::Display) -> Self {
        self.push_op("sub", value)
    }

    pub fn pow(self, value: impl fmt::Display) -> Self {
        self.push_op("pow", value)
    }

    pub fn and(self) -> Self {
        self.push("and")
    }

    pub fn or(self) -> Self {
        self.push("or")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.terms.join("_"))
    }
}
