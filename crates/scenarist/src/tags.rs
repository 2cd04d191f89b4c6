//! Tag expressions for scenario selection.
//!
//! Grammar: `@tag`, `and`, `or`, `not`, and parentheses, with the usual
//! precedence (`not` binds tightest, then `and`, then `or`). Operators are
//! case-insensitive; tag names are case-sensitive.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error describing where a tag expression failed to parse.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message} at byte {position}")]
pub struct TagExprError {
    /// Byte offset of the failure (zero-based).
    pub position: usize,
    /// Description of the failure.
    pub message: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Expr {
    Tag(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

/// A parsed tag expression such as `@smoke and not @slow`.
///
/// # Examples
///
/// ```
/// use scenarist::TagExpr;
///
/// let expr: TagExpr = "@smoke and not @slow".parse()?;
/// assert!(expr.matches(&["smoke", "fast"]));
/// assert!(!expr.matches(&["smoke", "slow"]));
/// # Ok::<(), scenarist::TagExprError>(())
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct TagExpr {
    root: Expr,
}

impl TagExpr {
    /// Parse a tag expression.
    ///
    /// # Errors
    /// Returns [`TagExprError`] for empty input, unknown tokens, dangling
    /// operators, or unbalanced parentheses.
    pub fn parse(input: &str) -> Result<Self, TagExprError> {
        if input.trim().is_empty() {
            return Err(TagExprError {
                position: 0,
                message: "empty tag expression".into(),
            });
        }
        let mut cursor = Cursor::new(input);
        let root = cursor.parse_or()?;
        cursor.skip_ws();
        if !cursor.at_end() {
            return Err(cursor.error("unexpected trailing input"));
        }
        Ok(Self { root })
    }

    /// Evaluate the expression against a scenario's tags.
    ///
    /// A leading `@` on either side is ignored, so stored tags may be bare.
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        let set: HashSet<&str> = tags
            .iter()
            .map(|tag| tag.as_ref().trim_start_matches('@'))
            .collect();
        eval(&self.root, &set)
    }
}

impl FromStr for TagExpr {
    type Err = TagExprError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl fmt::Display for TagExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, &self.root)
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    match expr {
        Expr::Tag(tag) => write!(f, "@{tag}"),
        Expr::And(left, right) => {
            write!(f, "(")?;
            write_expr(f, left)?;
            write!(f, " and ")?;
            write_expr(f, right)?;
            write!(f, ")")
        }
        Expr::Or(left, right) => {
            write!(f, "(")?;
            write_expr(f, left)?;
            write!(f, " or ")?;
            write_expr(f, right)?;
            write!(f, ")")
        }
        Expr::Not(inner) => {
            write!(f, "not ")?;
            write_expr(f, inner)
        }
    }
}

fn eval(expr: &Expr, tags: &HashSet<&str>) -> bool {
    match expr {
        Expr::Tag(tag) => tags.contains(tag.as_str()),
        Expr::And(left, right) => eval(left, tags) && eval(right, tags),
        Expr::Or(left, right) => eval(left, tags) || eval(right, tags),
        Expr::Not(inner) => !eval(inner, tags),
    }
}

struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            src: input.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> TagExprError {
        TagExprError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    /// Consume `word` when it appears here as a whole, case-insensitive word.
    fn eat_keyword(&mut self, word: &[u8]) -> bool {
        let end = self.pos + word.len();
        let matches_word = self
            .src
            .get(self.pos..end)
            .is_some_and(|segment| segment.eq_ignore_ascii_case(word));
        let boundary = !self
            .src
            .get(end)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_');
        if matches_word && boundary {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr, TagExprError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_ws();
            if !self.eat_keyword(b"or") {
                return Ok(left);
            }
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
    }

    fn parse_and(&mut self) -> Result<Expr, TagExprError> {
        let mut left = self.parse_not()?;
        loop {
            self.skip_ws();
            if !self.eat_keyword(b"and") {
                return Ok(left);
            }
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
    }

    fn parse_not(&mut self) -> Result<Expr, TagExprError> {
        self.skip_ws();
        if self.eat_keyword(b"not") {
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, TagExprError> {
        self.skip_ws();
        match self.peek() {
            Some(b'@') => {
                self.pos += 1;
                self.parse_tag().map(Expr::Tag)
            }
            Some(b'(') => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.skip_ws();
                if self.peek() != Some(b')') {
                    return Err(self.error("expected ')'"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(byte) => Err(self.error(format!("unknown token '{}'", byte as char))),
            None => Err(self.error("expected a tag or '('")),
        }
    }

    fn parse_tag(&mut self) -> Result<String, TagExprError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("missing tag name after '@'"));
        }
        let name = self.src.get(start..self.pos).unwrap_or_default();
        String::from_utf8(name.to_vec()).map_err(|_| self.error("tag is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(input: &str) -> TagExpr {
        TagExpr::parse(input)
            .unwrap_or_else(|err| panic!("expression {input:?} should parse: {err}"))
    }

    #[rstest]
    #[case("@a and @b or @c", &["a", "b"], true)]
    #[case("@a and @b or @c", &["c"], true)]
    #[case("@a and @b or @c", &["a"], false)]
    #[case("@a and (@b or @c)", &["a", "c"], true)]
    #[case("@a and (@b or @c)", &["b", "c"], false)]
    #[case("not @slow", &["fast"], true)]
    #[case("not @slow", &["slow"], false)]
    #[case("not not @a", &["a"], true)]
    fn honours_precedence_and_grouping(
        #[case] input: &str,
        #[case] tags: &[&str],
        #[case] expected: bool,
    ) {
        assert_eq!(parse(input).matches(tags), expected);
    }

    #[test]
    fn operators_are_case_insensitive_but_tags_are_not() {
        let expr = parse("@Smoke AnD NOT @slow");
        assert!(expr.matches(&["Smoke"]));
        assert!(!expr.matches(&["smoke"]));
    }

    #[test]
    fn leading_at_signs_on_stored_tags_are_tolerated() {
        let expr = parse("@smoke");
        assert!(expr.matches(&["@smoke"]));
    }

    #[rstest]
    #[case("", "empty tag expression")]
    #[case("@a && @b", "unknown token")]
    #[case("@a and", "expected a tag or '('")]
    #[case("(@a", "expected ')'")]
    #[case("@", "missing tag name")]
    #[case("@a @b", "unexpected trailing input")]
    fn reports_malformed_expressions(#[case] input: &str, #[case] expected: &str) {
        let err = match TagExpr::parse(input) {
            Err(err) => err,
            Ok(expr) => panic!("unexpectedly parsed {expr}"),
        };
        assert!(
            err.message.contains(expected),
            "error {err} should mention {expected:?}"
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        let expr = parse("@a and not (@b or @c)");
        let reparsed = parse(&expr.to_string());
        assert_eq!(expr, reparsed);
    }
}
