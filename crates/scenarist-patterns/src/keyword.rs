//! Step keyword model shared by pattern compilation and the runtime.

use gherkin::StepType;
use std::fmt;
use std::str::FromStr;

/// Keyword attached to a step or step definition.
///
/// `And` and `But` exist so parsed steps can carry their textual keyword, but
/// the engine resolves them against the preceding `Given`/`When`/`Then` via
/// [`resolve`](Self::resolve) before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKeyword {
    /// Establish a precondition.
    Given,
    /// Perform the action under test.
    When,
    /// Assert an expected outcome.
    Then,
    /// Continuation sharing the previous step's keyword class.
    And,
    /// Contrasting continuation sharing the previous step's keyword class.
    But,
}

impl StepKeyword {
    /// Return the canonical keyword text.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenarist_patterns::StepKeyword;
    ///
    /// assert_eq!(StepKeyword::When.as_str(), "When");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }

    /// True for `Given`, `When`, and `Then`.
    #[must_use]
    pub const fn is_primary(self) -> bool {
        !matches!(self, Self::And | Self::But)
    }

    /// Resolve a conjunction to the keyword class of the preceding step.
    ///
    /// Primary keywords update `prev` and return themselves; `And`/`But`
    /// return the stored keyword, defaulting to `Given` when no primary
    /// keyword has been seen yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenarist_patterns::StepKeyword;
    ///
    /// let mut prev = Some(StepKeyword::When);
    /// assert_eq!(StepKeyword::And.resolve(&mut prev), StepKeyword::When);
    /// assert_eq!(StepKeyword::Then.resolve(&mut prev), StepKeyword::Then);
    /// assert_eq!(prev, Some(StepKeyword::Then));
    /// ```
    #[must_use]
    pub fn resolve(self, prev: &mut Option<Self>) -> Self {
        if self.is_primary() {
            *prev = Some(self);
            self
        } else {
            prev.unwrap_or(Self::Given)
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when keyword text does not name a known keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepKeywordParseError(pub String);

impl fmt::Display for StepKeywordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid step keyword: {}", self.0)
    }
}

impl std::error::Error for StepKeywordParseError {}

impl FromStr for StepKeyword {
    type Err = StepKeywordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        [Self::Given, Self::When, Self::Then, Self::And, Self::But]
            .into_iter()
            .find(|kw| trimmed.eq_ignore_ascii_case(kw.as_str()))
            .ok_or_else(|| StepKeywordParseError(trimmed.to_string()))
    }
}

/// Error raised when a parsed Gherkin [`StepType`] has no keyword mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedStepType(pub StepType);

impl fmt::Display for UnsupportedStepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported step type: {:?}", self.0)
    }
}

impl std::error::Error for UnsupportedStepType {}

impl TryFrom<StepType> for StepKeyword {
    type Error = UnsupportedStepType;

    fn try_from(ty: StepType) -> Result<Self, Self::Error> {
        match ty {
            StepType::Given => Ok(Self::Given),
            StepType::When => Ok(Self::When),
            StepType::Then => Ok(Self::Then),
        }
    }
}
