//! Step-pattern parsing and compilation for the scenarist engine.
//!
//! A step pattern is the literal text of a step with `{name}` or
//! `{name:hint}` placeholders marking the values a step definition wants to
//! capture. This crate lexes such patterns, compiles them into anchored
//! regular-expression sources, and extracts the captured values from matching
//! step text. The [`StepKeyword`] type shared by pattern compilation and the
//! runtime lives here too, so both sides agree on keyword semantics.

mod capture;
mod error;
mod hint;
mod keyword;
mod pattern;

pub use capture::extract_captured_values;
pub use error::PatternError;
pub use hint::hint_fragment;
pub use keyword::{StepKeyword, StepKeywordParseError, UnsupportedStepType};
pub use pattern::{build_pattern_source, compile_pattern};
