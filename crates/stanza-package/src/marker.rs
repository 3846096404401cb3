//! Environment markers.
//!
//! Markers are boolean expressions over named environment variables, used to
//! decide whether a dependency applies in a given environment:
//!
//! ```text
//! python_version >= "2.7" and python_version < "2.8" or python_version >= "3.4"
//! ```
//!
//! [`parse_marker`] parses the textual grammar, [`Marker::evaluate`] checks
//! an expression against an environment map, and [`nested_marker`] derives
//! the marker text for a version constraint on a single variable.

use crate::version::{PythonVersion, VersionConstraint};
use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

/// Comparison operator inside a marker expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerOperator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>=`
    GreaterEqual,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `~=`
    Compatible,
    /// `in`
    In,
    /// `not in`
    NotIn,
}

impl MarkerOperator {
    /// Parse an operator token.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            ">=" => Some(Self::GreaterEqual),
            "<=" => Some(Self::LessEqual),
            ">" => Some(Self::Greater),
            "<" => Some(Self::Less),
            "~=" => Some(Self::Compatible),
            "in" => Some(Self::In),
            "not in" => Some(Self::NotIn),
            _ => None,
        }
    }

    #[must_use]
    const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::Compatible => "~=",
            Self::In => "in",
            Self::NotIn => "not in",
        }
    }
}

impl fmt::Display for MarkerOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A boolean-evaluable marker expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Always true; the marker of an unconstrained dependency.
    Any,
    /// A single comparison, e.g. `python_version >= "3.8"`.
    Expression {
        /// Environment variable name.
        variable: Arc<str>,
        /// Comparison operator.
        operator: MarkerOperator,
        /// Right-hand literal.
        value: Arc<str>,
    },
    /// Conjunction of sub-markers.
    And(Vec<Marker>),
    /// Disjunction of sub-markers.
    Or(Vec<Marker>),
}

impl Marker {
    /// Build a single comparison expression.
    #[must_use]
    pub fn expression(
        variable: impl Into<Arc<str>>,
        operator: MarkerOperator,
        value: impl Into<Arc<str>>,
    ) -> Self {
        Self::Expression {
            variable: variable.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate this marker against an environment.
    ///
    /// Comparisons are version-aware when both sides parse as versions and
    /// fall back to string comparison otherwise. A variable missing from the
    /// environment makes its comparison false.
    #[must_use]
    pub fn evaluate(&self, environment: &AHashMap<String, String>) -> bool {
        match self {
            Self::Any => true,
            Self::Expression {
                variable,
                operator,
                value,
            } => environment
                .get(variable.as_ref())
                .is_some_and(|actual| compare(actual, *operator, value)),
            Self::And(markers) => markers.iter().all(|m| m.evaluate(environment)),
            Self::Or(markers) => markers.iter().any(|m| m.evaluate(environment)),
        }
    }
}

fn compare(actual: &str, operator: MarkerOperator, expected: &str) -> bool {
    // Membership operators are plain substring checks
    match operator {
        MarkerOperator::In => return expected.contains(actual),
        MarkerOperator::NotIn => return !expected.contains(actual),
        _ => {}
    }

    if let (Some(actual_version), Some(expected_version)) =
        (PythonVersion::parse(actual), PythonVersion::parse(expected))
    {
        return match operator {
            MarkerOperator::Equal => actual_version == expected_version,
            MarkerOperator::NotEqual => actual_version != expected_version,
            MarkerOperator::GreaterEqual => actual_version >= expected_version,
            MarkerOperator::LessEqual => actual_version <= expected_version,
            MarkerOperator::Greater => actual_version > expected_version,
            MarkerOperator::Less => actual_version < expected_version,
            MarkerOperator::Compatible => VersionConstraint::parse(&format!("~={expected}"))
                .is_some_and(|c| c.matches(&actual_version)),
            MarkerOperator::In | MarkerOperator::NotIn => unreachable!(),
        };
    }

    match operator {
        MarkerOperator::Equal => actual == expected,
        MarkerOperator::NotEqual => actual != expected,
        MarkerOperator::GreaterEqual => actual >= expected,
        MarkerOperator::LessEqual => actual <= expected,
        MarkerOperator::Greater => actual > expected,
        MarkerOperator::Less => actual < expected,
        MarkerOperator::Compatible => false,
        MarkerOperator::In | MarkerOperator::NotIn => unreachable!(),
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => Ok(()),
            Self::Expression {
                variable,
                operator,
                value,
            } => write!(f, "{variable} {operator} \"{value}\""),
            Self::And(markers) => {
                for (i, marker) in markers.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    if matches!(marker, Self::Or(_)) {
                        write!(f, "({marker})")?;
                    } else {
                        write!(f, "{marker}")?;
                    }
                }
                Ok(())
            }
            Self::Or(markers) => {
                for (i, marker) in markers.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{marker}")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Marker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Marker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_marker(&s).map_err(serde::de::Error::custom)
    }
}

/// Error when parsing a marker expression.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid marker expression: {0}")]
pub struct MarkerParseError(pub String);

impl From<MarkerParseError> for stanza_core::Error {
    fn from(err: MarkerParseError) -> Self {
        Self::invalid_marker(err.0)
    }
}

/// Parse a marker expression.
///
/// Blank input parses to [`Marker::Any`], matching the convention that the
/// nested marker of an unconstrained dependency is the empty string.
///
/// # Errors
/// Returns [`MarkerParseError`] on malformed input.
pub fn parse_marker(input: &str) -> Result<Marker, MarkerParseError> {
    let tokens = tokenize(input).ok_or_else(|| MarkerParseError(input.to_string()))?;
    if tokens.is_empty() {
        return Ok(Marker::Any);
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let marker = parser
        .parse_or()
        .ok_or_else(|| MarkerParseError(input.to_string()))?;
    if parser.pos != tokens.len() {
        return Err(MarkerParseError(input.to_string()));
    }
    Ok(marker)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Literal(String),
    Operator(String),
    And,
    Or,
    Not,
    OpenParen,
    CloseParen,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(i, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::OpenParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::CloseParen);
            }
            '"' | '\'' => {
                chars.next();
                let start = i + 1;
                let mut end = start;
                loop {
                    let (j, d) = chars.next()?;
                    if d == c {
                        end = j;
                        break;
                    }
                }
                tokens.push(Token::Literal(input[start..end].to_string()));
            }
            '<' | '>' | '=' | '!' | '~' => {
                chars.next();
                let op = if chars.peek().is_some_and(|&(_, d)| d == '=') {
                    chars.next();
                    format!("{c}=")
                } else {
                    c.to_string()
                };
                // Bare '!' or '~' is not an operator
                if op == "!" || op == "~" {
                    return None;
                }
                tokens.push(Token::Operator(op));
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let start = i;
                let mut end = i;
                while let Some(&(j, d)) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' || d == '.' {
                        end = j + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let word = &input[start..end];
                tokens.push(match word {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "in" => Token::Operator("in".to_string()),
                    _ => Token::Ident(word.to_string()),
                });
            }
            _ => return None,
        }
    }

    Some(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn parse_or(&mut self) -> Option<Marker> {
        let mut members = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.next();
            members.push(self.parse_and()?);
        }
        if members.len() == 1 {
            members.pop()
        } else {
            Some(Marker::Or(members))
        }
    }

    fn parse_and(&mut self) -> Option<Marker> {
        let mut members = vec![self.parse_atom()?];
        while self.peek() == Some(&Token::And) {
            self.next();
            members.push(self.parse_atom()?);
        }
        if members.len() == 1 {
            members.pop()
        } else {
            Some(Marker::And(members))
        }
    }

    fn parse_atom(&mut self) -> Option<Marker> {
        if self.peek() == Some(&Token::OpenParen) {
            self.next();
            let inner = self.parse_or()?;
            if self.next() != Some(&Token::CloseParen) {
                return None;
            }
            return Some(inner);
        }

        let variable = match self.next()? {
            Token::Ident(name) => Arc::<str>::from(name.as_str()),
            _ => return None,
        };

        let operator = match self.next()? {
            Token::Operator(op) => MarkerOperator::parse(op)?,
            // `not in` arrives as two tokens
            Token::Not => match self.next()? {
                Token::Operator(op) if op == "in" => MarkerOperator::NotIn,
                _ => return None,
            },
            _ => return None,
        };

        let value = match self.next()? {
            Token::Literal(value) => Arc::<str>::from(value.as_str()),
            _ => return None,
        };

        Some(Marker::Expression {
            variable,
            operator,
            value,
        })
    }
}

/// Build the marker text binding `variable` to a version constraint.
///
/// An any-constraint yields the empty string; an empty constraint yields a
/// comparison no valid version satisfies. The result always parses with
/// [`parse_marker`].
#[must_use]
pub fn nested_marker(variable: &str, constraint: &VersionConstraint) -> String {
    if constraint.is_any() {
        return String::new();
    }
    if constraint.is_empty() {
        return format!("{variable} < \"0\"");
    }

    let mut groups = Vec::new();
    for (start, end) in constraint.ranges().iter() {
        let mut parts = Vec::new();

        match (start, end) {
            // Singleton segment renders as equality
            (Bound::Included(lo), Bound::Included(hi)) if lo == hi => {
                parts.push(format!("{variable} == \"{lo}\""));
            }
            _ => {
                match start {
                    Bound::Included(v) => parts.push(format!("{variable} >= \"{v}\"")),
                    Bound::Excluded(v) => parts.push(format!("{variable} > \"{v}\"")),
                    Bound::Unbounded => {}
                }
                match end {
                    Bound::Included(v) => parts.push(format!("{variable} <= \"{v}\"")),
                    Bound::Excluded(v) => parts.push(format!("{variable} < \"{v}\"")),
                    Bound::Unbounded => {}
                }
            }
        }

        if !parts.is_empty() {
            groups.push(parts.join(" and "));
        }
    }

    groups.join(" or ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn env(entries: &[(&str, &str)]) -> AHashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    mod parsing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn single_expression() {
            let marker = parse_marker("python_version >= \"3.8\"").unwrap();
            assert_eq!(
                marker,
                Marker::expression("python_version", MarkerOperator::GreaterEqual, "3.8")
            );
        }

        #[test]
        fn single_quotes() {
            let marker = parse_marker("sys_platform == 'linux'").unwrap();
            assert_eq!(
                marker,
                Marker::expression("sys_platform", MarkerOperator::Equal, "linux")
            );
        }

        #[test]
        fn and_or_precedence() {
            let marker = parse_marker(
                "python_version >= \"2.7\" and python_version < \"2.8\" or python_version >= \"3.4\"",
            )
            .unwrap();
            assert_eq!(
                marker,
                Marker::Or(vec![
                    Marker::And(vec![
                        Marker::expression(
                            "python_version",
                            MarkerOperator::GreaterEqual,
                            "2.7"
                        ),
                        Marker::expression("python_version", MarkerOperator::Less, "2.8"),
                    ]),
                    Marker::expression("python_version", MarkerOperator::GreaterEqual, "3.4"),
                ])
            );
        }

        #[test]
        fn parentheses() {
            let marker = parse_marker(
                "sys_platform == \"linux\" and (python_version < \"3.0\" or python_version >= \"3.4\")",
            )
            .unwrap();
            match marker {
                Marker::And(members) => {
                    assert_eq!(members.len(), 2);
                    assert!(matches!(members[1], Marker::Or(_)));
                }
                other => panic!("expected And, got {other:?}"),
            }
        }

        #[test]
        fn not_in() {
            let marker = parse_marker("sys_platform not in \"win32 cygwin\"").unwrap();
            assert_eq!(
                marker,
                Marker::expression("sys_platform", MarkerOperator::NotIn, "win32 cygwin")
            );
        }

        #[test]
        fn empty_is_any() {
            assert_eq!(parse_marker("").unwrap(), Marker::Any);
            assert_eq!(parse_marker("   ").unwrap(), Marker::Any);
        }

        #[test]
        fn rejects_garbage() {
            assert!(parse_marker("python_version >=").is_err());
            assert!(parse_marker(">= \"3.8\"").is_err());
            assert!(parse_marker("python_version >= \"3.8\" and").is_err());
            assert!(parse_marker("(python_version >= \"3.8\"").is_err());
            assert!(parse_marker("python_version ! \"3.8\"").is_err());
        }
    }

    mod evaluation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn version_comparison() {
            let marker = parse_marker("python_version >= \"3.8\"").unwrap();
            assert!(marker.evaluate(&env(&[("python_version", "3.10")])));
            assert!(!marker.evaluate(&env(&[("python_version", "3.7")])));
        }

        #[test]
        fn version_comparison_is_numeric_not_lexicographic() {
            let marker = parse_marker("python_version < \"3.10\"").unwrap();
            // "3.9" > "3.10" as strings; versions must compare numerically
            assert!(marker.evaluate(&env(&[("python_version", "3.9")])));
        }

        #[test]
        fn string_comparison() {
            let marker = parse_marker("sys_platform == \"linux\"").unwrap();
            assert!(marker.evaluate(&env(&[("sys_platform", "linux")])));
            assert!(!marker.evaluate(&env(&[("sys_platform", "darwin")])));
        }

        #[test]
        fn missing_variable_is_false() {
            let marker = parse_marker("python_version >= \"3.8\"").unwrap();
            assert!(!marker.evaluate(&env(&[])));
        }

        #[test]
        fn any_is_true() {
            assert!(Marker::Any.evaluate(&env(&[])));
        }

        #[test]
        fn and_or_evaluation() {
            let marker = parse_marker(
                "python_version >= \"2.7\" and python_version < \"2.8\" or python_version >= \"3.4\"",
            )
            .unwrap();
            assert!(marker.evaluate(&env(&[("python_version", "2.7.18")])));
            assert!(marker.evaluate(&env(&[("python_version", "3.11")])));
            assert!(!marker.evaluate(&env(&[("python_version", "3.0")])));
            assert!(!marker.evaluate(&env(&[("python_version", "2.8")])));
        }

        #[test]
        fn membership() {
            let marker = parse_marker("sys_platform in \"linux darwin\"").unwrap();
            assert!(marker.evaluate(&env(&[("sys_platform", "linux")])));
            assert!(!marker.evaluate(&env(&[("sys_platform", "win32")])));
        }
    }

    mod nested {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn any_constraint_is_empty_string() {
            let constraint = VersionConstraint::any();
            assert_eq!(nested_marker("python_version", &constraint), "");
            assert_eq!(parse_marker("").unwrap(), Marker::Any);
        }

        #[test]
        fn simple_lower_bound() {
            let constraint = VersionConstraint::parse(">=3.8").unwrap();
            assert_eq!(
                nested_marker("python_version", &constraint),
                "python_version >= \"3.8\""
            );
        }

        #[test]
        fn bounded_range() {
            let constraint = VersionConstraint::parse(">=3.8,<4.0").unwrap();
            assert_eq!(
                nested_marker("python_version", &constraint),
                "python_version >= \"3.8\" and python_version < \"4.0\""
            );
        }

        #[test]
        fn union_of_ranges() {
            let constraint = VersionConstraint::parse("~2.7 || >=3.4").unwrap();
            let text = nested_marker("python_version", &constraint);
            assert_eq!(
                text,
                "python_version >= \"2.7\" and python_version < \"2.8.0\" or python_version >= \"3.4\""
            );

            let marker = parse_marker(&text).unwrap();
            assert!(marker.evaluate(&env(&[("python_version", "2.7.18")])));
            assert!(marker.evaluate(&env(&[("python_version", "3.12")])));
            assert!(!marker.evaluate(&env(&[("python_version", "3.1")])));
        }

        #[test]
        fn singleton_renders_as_equality() {
            let constraint = VersionConstraint::parse("==3.8.1").unwrap();
            assert_eq!(
                nested_marker("python_version", &constraint),
                "python_version == \"3.8.1\""
            );
        }

        #[test]
        fn empty_constraint_never_matches() {
            let constraint = VersionConstraint::empty();
            let text = nested_marker("python_version", &constraint);
            let marker = parse_marker(&text).unwrap();
            assert!(!marker.evaluate(&env(&[("python_version", "3.11")])));
        }

        #[test]
        fn always_parseable() {
            for spec in ["*", ">=3.8", "~2.7 || >=3.4", "!=3.9", "3.8.*", "^3.8"] {
                let constraint = VersionConstraint::parse(spec).unwrap();
                let text = nested_marker("python_version", &constraint);
                assert!(parse_marker(&text).is_ok(), "failed for {spec}: {text}");
            }
        }
    }

    mod display {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn roundtrip() {
            let text = "python_version >= \"2.7\" and python_version < \"2.8\" or python_version >= \"3.4\"";
            let marker = parse_marker(text).unwrap();
            assert_eq!(parse_marker(&marker.to_string()).unwrap(), marker);
        }

        #[test]
        fn parenthesizes_or_inside_and() {
            let marker = Marker::And(vec![
                Marker::expression("sys_platform", MarkerOperator::Equal, "linux"),
                Marker::Or(vec![
                    Marker::expression("python_version", MarkerOperator::Less, "3.0"),
                    Marker::expression("python_version", MarkerOperator::GreaterEqual, "3.4"),
                ]),
            ]);
            let text = marker.to_string();
            assert!(text.contains('('));
            assert_eq!(parse_marker(&text).unwrap(), marker);
        }
    }
}
