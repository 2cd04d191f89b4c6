//! Compiled step patterns.

use std::fmt;

use regex::Regex;
use scenarist_patterns::{PatternError, compile_pattern, extract_captured_values};

/// A step pattern together with its compiled, anchored regular expression.
///
/// Compilation happens eagerly when the pattern is built, so a malformed
/// pattern is reported at registration time rather than mid-run.
#[derive(Debug, Clone)]
pub struct StepPattern {
    text: String,
    regex: Regex,
}

impl StepPattern {
    /// Compile `text` into a usable step pattern.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the pattern contains malformed
    /// placeholders or stray braces.
    pub fn compile(text: impl Into<String>) -> Result<Self, PatternError> {
        let text = text.into();
        let regex = compile_pattern(&text)?;
        Ok(Self { text, regex })
    }

    /// The original pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Extract placeholder captures when `step_text` matches in full.
    #[must_use]
    pub fn captures(&self, step_text: &str) -> Option<Vec<String>> {
        extract_captured_values(&self.regex, step_text)
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
