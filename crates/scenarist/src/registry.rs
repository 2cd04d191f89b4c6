//! Step definitions and the registry that holds them.
//!
//! Registration is explicit: callers build a [`StepRegistry`] value and add
//! definitions one by one. Duplicate patterns and malformed pattern syntax
//! are rejected at registration time, before any scenario runs. Once handed
//! to a runner the registry is never mutated, so it can be shared across
//! worker threads behind an `Arc`.

use std::fmt;
use std::str::FromStr;

use scenarist_patterns::{PatternError, StepKeyword};
use thiserror::Error;

use crate::context::Context;
use crate::pattern::StepPattern;

/// Failure produced by a step action or hook.
///
/// Carries a message and, when built via [`bail_step!`](crate::bail_step) or
/// [`ensure_step!`](crate::ensure_step), the source location of the failing
/// assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepError {
    message: String,
    location: Option<(&'static str, u32)>,
}

impl StepError {
    /// Build an error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Build an error that records where the failure was raised.
    #[must_use]
    pub fn with_location(message: impl Into<String>, file: &'static str, line: u32) -> Self {
        Self {
            message: message.into(),
            location: Some((file, line)),
        }
    }

    /// The failure message without location decoration.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn parse_failure(index: usize, raw: &str) -> Self {
        Self::new(format!(
            "failed to parse capture {index} from value '{raw}'"
        ))
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some((file, line)) => write!(f, "{} ({file}:{line})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for StepError {}

impl From<String> for StepError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for StepError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Arguments handed to a step action: ordered placeholder captures plus the
/// step's optional doc string and data table.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepArgs<'a> {
    captures: &'a [String],
    docstring: Option<&'a str>,
    table: Option<&'a [Vec<String>]>,
}

impl<'a> StepArgs<'a> {
    pub(crate) fn new(
        captures: &'a [String],
        docstring: Option<&'a str>,
        table: Option<&'a [Vec<String>]>,
    ) -> Self {
        Self {
            captures,
            docstring,
            table,
        }
    }

    /// Raw capture at `index`, in placeholder order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.captures.get(index).map(String::as_str)
    }

    /// Parse the capture at `index` into `T`.
    ///
    /// # Errors
    /// Returns [`StepError`] when the capture is missing or fails to parse.
    pub fn parse<T: FromStr>(&self, index: usize) -> Result<T, StepError> {
        let raw = self
            .get(index)
            .ok_or_else(|| StepError::new(format!("no capture at index {index}")))?;
        raw.parse()
            .map_err(|_| StepError::parse_failure(index, raw))
    }

    /// The step's doc string, if any.
    #[must_use]
    pub fn docstring(&self) -> Option<&'a str> {
        self.docstring
    }

    /// The step's data table rows, if any.
    #[must_use]
    pub fn table(&self) -> Option<&'a [Vec<String>]> {
        self.table
    }

    /// Number of captures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// True when the pattern captured nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}

type StepAction = Box<dyn Fn(&mut Context, &StepArgs<'_>) -> Result<(), StepError> + Send + Sync>;

/// A registered step definition: keyword class, compiled pattern, action.
pub struct StepDefinition {
    keyword: StepKeyword,
    pattern: StepPattern,
    action: StepAction,
}

impl StepDefinition {
    /// Keyword class the definition binds.
    #[must_use]
    pub fn keyword(&self) -> StepKeyword {
        self.keyword
    }

    /// The compiled step pattern.
    #[must_use]
    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    pub(crate) fn call(&self, ctx: &mut Context, args: &StepArgs<'_>) -> Result<(), StepError> {
        (self.action)(ctx, args)
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("keyword", &self.keyword)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Errors raised while registering a step definition.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistrationError {
    /// The pattern text failed to compile.
    #[error("step pattern '{pattern}' is invalid: {source}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// The underlying compilation failure.
        #[source]
        source: PatternError,
    },
    /// The (keyword, pattern) pair is already registered.
    #[error("duplicate step definition: {keyword} '{pattern}'")]
    DuplicatePattern {
        /// Keyword class of the existing definition.
        keyword: StepKeyword,
        /// Pattern text of the existing definition.
        pattern: String,
    },
    /// Definitions must bind `Given`, `When`, or `Then`.
    #[error("step definitions must use a primary keyword, got {keyword}")]
    ConjunctionKeyword {
        /// The rejected keyword.
        keyword: StepKeyword,
    },
}

/// Holds every step definition available to a run.
#[derive(Debug, Default)]
pub struct StepRegistry {
    definitions: Vec<StepDefinition>,
}

impl StepRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step definition.
    ///
    /// # Errors
    /// Returns [`RegistrationError`] when the pattern is malformed, the
    /// (keyword, pattern) pair already exists, or `keyword` is `And`/`But`.
    pub fn register(
        &mut self,
        keyword: StepKeyword,
        pattern: &str,
        action: impl Fn(&mut Context, &StepArgs<'_>) -> Result<(), StepError> + Send + Sync + 'static,
    ) -> Result<(), RegistrationError> {
        if !keyword.is_primary() {
            return Err(RegistrationError::ConjunctionKeyword { keyword });
        }
        if self
            .definitions
            .iter()
            .any(|def| def.keyword == keyword && def.pattern.as_str() == pattern)
        {
            return Err(RegistrationError::DuplicatePattern {
                keyword,
                pattern: pattern.to_string(),
            });
        }
        let pattern =
            StepPattern::compile(pattern).map_err(|source| RegistrationError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        log::debug!("registered {keyword} step '{pattern}'");
        self.definitions.push(StepDefinition {
            keyword,
            pattern,
            action: Box::new(action),
        });
        Ok(())
    }

    /// Register a `Given` step.
    ///
    /// # Errors
    /// See [`register`](Self::register).
    pub fn given(
        &mut self,
        pattern: &str,
        action: impl Fn(&mut Context, &StepArgs<'_>) -> Result<(), StepError> + Send + Sync + 'static,
    ) -> Result<(), RegistrationError> {
        self.register(StepKeyword::Given, pattern, action)
    }

    /// Register a `When` step.
    ///
    /// # Errors
    /// See [`register`](Self::register).
    pub fn when(
        &mut self,
        pattern: &str,
        action: impl Fn(&mut Context, &StepArgs<'_>) -> Result<(), StepError> + Send + Sync + 'static,
    ) -> Result<(), RegistrationError> {
        self.register(StepKeyword::When, pattern, action)
    }

    /// Register a `Then` step.
    ///
    /// # Errors
    /// See [`register`](Self::register).
    pub fn then(
        &mut self,
        pattern: &str,
        action: impl Fn(&mut Context, &StepArgs<'_>) -> Result<(), StepError> + Send + Sync + 'static,
    ) -> Result<(), RegistrationError> {
        self.register(StepKeyword::Then, pattern, action)
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True when no definitions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub(crate) fn definitions(&self) -> &[StepDefinition] {
        &self.definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Context, _: &StepArgs<'_>) -> Result<(), StepError> {
        Ok(())
    }

    #[test]
    fn registers_distinct_definitions() {
        let mut registry = StepRegistry::new();
        registry
            .given("a user", noop)
            .unwrap_or_else(|err| panic!("registration should succeed: {err}"));
        registry
            .when("a user", noop)
            .unwrap_or_else(|err| panic!("same pattern under another keyword is fine: {err}"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rejects_duplicate_pattern_for_same_keyword() {
        let mut registry = StepRegistry::new();
        registry
            .given("a user", noop)
            .unwrap_or_else(|err| panic!("registration should succeed: {err}"));
        let err = match registry.given("a user", noop) {
            Err(err) => err,
            Ok(()) => panic!("duplicate registration should fail"),
        };
        assert!(matches!(err, RegistrationError::DuplicatePattern { .. }));
        assert_eq!(err.to_string(), "duplicate step definition: Given 'a user'");
    }

    #[test]
    fn rejects_invalid_pattern_syntax() {
        let mut registry = StepRegistry::new();
        let err = match registry.when("missing {brace", noop) {
            Err(err) => err,
            Ok(()) => panic!("malformed pattern should fail"),
        };
        assert!(matches!(err, RegistrationError::InvalidPattern { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_conjunction_keywords() {
        let mut registry = StepRegistry::new();
        let err = match registry.register(StepKeyword::And, "anything", noop) {
            Err(err) => err,
            Ok(()) => panic!("conjunction registration should fail"),
        };
        assert!(matches!(
            err,
            RegistrationError::ConjunctionKeyword {
                keyword: StepKeyword::And
            }
        ));
    }

    #[test]
    fn step_args_parse_reports_bad_values() {
        let captures = vec![String::from("7"), String::from("NaN")];
        let args = StepArgs::new(&captures, None, None);
        assert_eq!(args.parse::<u32>(0), Ok(7));
        let err = match args.parse::<u32>(1) {
            Err(err) => err,
            Ok(v) => panic!("unexpectedly parsed {v}"),
        };
        assert_eq!(
            err.message(),
            "failed to parse capture 1 from value 'NaN'"
        );
        assert!(args.parse::<u32>(2).is_err());
    }

    #[test]
    fn step_error_display_includes_location() {
        let err = StepError::with_location("boom", "steps.rs", 12);
        assert_eq!(err.to_string(), "boom (steps.rs:12)");
        assert_eq!(err.message(), "boom");
    }
}
