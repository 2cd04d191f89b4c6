//! Lexing and compilation of step patterns into anchored regexes.
//!
//! A pattern alternates literal text with `{name}` / `{name:hint}` capture
//! slots. Literal text is regex-escaped, so only placeholders can match
//! variable input; the compiled source is anchored at both ends, making a
//! match cover the whole step text. `{{` and `}}` denote literal braces.

use regex::Regex;

use crate::error::PatternError;
use crate::hint::{HintClass, classify};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture { name: String, hint: Option<String> },
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_name_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn scan(pattern: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.char_indices().peekable();

    let flush = |literal: &mut String, segments: &mut Vec<Segment>| {
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(literal)));
        }
    };

    while let Some((position, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                flush(&mut literal, &mut segments);
                segments.push(scan_placeholder(&mut chars, position)?);
            }
            '}' => {
                return Err(PatternError::Brace {
                    message: "unmatched '}'",
                    position,
                });
            }
            _ => literal.push(ch),
        }
    }

    flush(&mut literal, &mut segments);
    Ok(segments)
}

/// Consume a placeholder body after its opening brace at `position`.
fn scan_placeholder(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    position: usize,
) -> Result<Segment, PatternError> {
    let mut name = String::new();
    let mut hint: Option<String> = None;
    let fail = |message, name: &String| PatternError::Placeholder {
        message,
        position,
        name: name.clone(),
    };

    for (_, ch) in chars.by_ref() {
        match ch {
            '}' => {
                if name.is_empty() {
                    return Err(fail("empty placeholder name", &name));
                }
                if hint.as_ref().is_some_and(String::is_empty) {
                    return Err(fail("empty type hint", &name));
                }
                return Ok(Segment::Capture { name, hint });
            }
            ':' if hint.is_none() && !name.is_empty() => hint = Some(String::new()),
            ch => {
                let target = match hint.as_mut() {
                    Some(hint) => hint,
                    None => &mut name,
                };
                let valid = if target.is_empty() {
                    is_name_start(ch)
                } else {
                    is_name_continue(ch)
                };
                if !valid {
                    return Err(fail("invalid character in placeholder", &name));
                }
                target.push(ch);
            }
        }
    }

    Err(fail("missing closing '}'", &name))
}

/// Build the anchored regular-expression source for a step pattern.
///
/// # Errors
/// Returns [`PatternError`] when the pattern contains a malformed placeholder
/// or an unescaped stray brace.
///
/// # Examples
/// ```
/// use scenarist_patterns::build_pattern_source;
///
/// let source = build_pattern_source("I have {count:u32} cukes")?;
/// assert_eq!(source, r"^I have (\d+) cukes$");
/// # Ok::<(), scenarist_patterns::PatternError>(())
/// ```
pub fn build_pattern_source(pattern: &str) -> Result<String, PatternError> {
    let segments = scan(pattern)?;
    let mut source = String::with_capacity(pattern.len().saturating_mul(2).saturating_add(2));
    source.push('^');
    for segment in &segments {
        match segment {
            Segment::Literal(text) => source.push_str(&regex::escape(text)),
            Segment::Capture { hint, .. } => match classify(hint.as_deref()) {
                HintClass::Plain(fragment) => {
                    source.push('(');
                    source.push_str(fragment);
                    source.push(')');
                }
                // Quotes frame the group but stay out of the capture.
                HintClass::Quoted(fragment) => {
                    source.push('"');
                    source.push('(');
                    source.push_str(fragment);
                    source.push(')');
                    source.push('"');
                }
            },
        }
    }
    source.push('$');
    Ok(source)
}

/// Compile a step pattern into its anchored [`Regex`].
///
/// # Errors
/// Returns [`PatternError`] when the pattern is malformed or the generated
/// source is rejected by the regex engine.
pub fn compile_pattern(pattern: &str) -> Result<Regex, PatternError> {
    let source = build_pattern_source(pattern)?;
    Regex::new(&source).map_err(PatternError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn source_for(pattern: &str) -> String {
        build_pattern_source(pattern)
            .unwrap_or_else(|err| panic!("pattern {pattern:?} should compile: {err}"))
    }

    #[rstest]
    #[case("a plain step", "^a plain step$")]
    #[case("I have {count:u32} cukes", r"^I have (\d+) cukes$")]
    #[case("a balance of {amount:i64}", r"^a balance of ([+-]?\d+)$")]
    #[case("user {name:word} exists", r"^user (\S+) exists$")]
    #[case("the note says {text:string}", r#"^the note says "([^"]*)"$"#)]
    #[case("{anything}", "^(.+?)$")]
    #[case("{value:Unknown}", "^(.+?)$")]
    #[case("literal {{braces}} kept", r"^literal \{braces\} kept$")]
    fn compiles_expected_sources(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(source_for(pattern), expected);
    }

    #[test]
    fn escapes_regex_metacharacters_in_literals() {
        assert_eq!(source_for("costs $5 (net)"), r"^costs \$5 \(net\)$");
    }

    #[rstest]
    #[case("broken}", "unmatched '}'")]
    #[case("{open", "missing closing '}'")]
    #[case("{}", "empty placeholder name")]
    #[case("{name:}", "empty type hint")]
    #[case("{9lives}", "invalid character in placeholder")]
    #[case("{outer {inner}}", "invalid character in placeholder")]
    fn rejects_malformed_patterns(#[case] pattern: &str, #[case] expected: &str) {
        let err = match build_pattern_source(pattern) {
            Err(err) => err,
            Ok(source) => panic!("pattern {pattern:?} unexpectedly compiled to {source}"),
        };
        assert!(
            err.to_string().contains(expected),
            "error {err} should mention {expected:?}"
        );
    }

    #[test]
    fn quoted_capture_excludes_quotes() {
        let regex = compile_pattern("the note says {text:string}")
            .unwrap_or_else(|err| panic!("pattern should compile: {err}"));
        let captures = crate::extract_captured_values(&regex, r#"the note says "hi there""#)
            .unwrap_or_else(|| panic!("step text should match"));
        assert_eq!(captures, vec!["hi there".to_string()]);
    }

    #[test]
    fn anchored_match_rejects_prefix_and_suffix_text() {
        let regex = compile_pattern("exactly {n:u32}")
            .unwrap_or_else(|err| panic!("pattern should compile: {err}"));
        assert!(!regex.is_match("well exactly 3"));
        assert!(!regex.is_match("exactly 3 items"));
        assert!(regex.is_match("exactly 3"));
    }
}
