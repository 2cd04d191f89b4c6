//! Errors raised while parsing and compiling step patterns.

use thiserror::Error;

/// Errors surfaced while turning a step pattern into a regular expression.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// A placeholder was malformed at the given byte offset.
    #[error("{message} for placeholder `{name}` at byte {position}")]
    Placeholder {
        /// Description of the failure.
        message: &'static str,
        /// Byte offset of the opening brace (zero-based).
        position: usize,
        /// The placeholder name, as far as it could be read.
        name: String,
    },
    /// Braces outside a placeholder were not balanced.
    #[error("{message} at byte {position}")]
    Brace {
        /// Description of the failure.
        message: &'static str,
        /// Byte offset of the offending brace (zero-based).
        position: usize,
    },
    /// The compiled source was rejected by the regex engine.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_placeholder_error() {
        let err = PatternError::Placeholder {
            message: "missing closing '}'",
            position: 4,
            name: "count".into(),
        };
        assert_eq!(
            err.to_string(),
            "missing closing '}' for placeholder `count` at byte 4"
        );
    }

    #[test]
    fn formats_brace_error() {
        let err = PatternError::Brace {
            message: "unmatched '}'",
            position: 9,
        };
        assert_eq!(err.to_string(), "unmatched '}' at byte 9");
    }

    #[test]
    fn forwards_regex_error_display() {
        let err = PatternError::from(regex::Error::Syntax("bad".into()));
        assert_eq!(
            err.to_string(),
            regex::Error::Syntax("bad".into()).to_string()
        );
    }
}
