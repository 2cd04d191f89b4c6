//! Extraction of placeholder captures from matched step text.

use regex::Regex;

/// Extract the placeholder captures when `text` matches `re` in full.
///
/// Returns `None` when the text does not match, so callers can branch on a
/// missing match rather than inspect an empty capture set. Group 0 (the whole
/// match) is skipped; groups that did not participate yield empty strings to
/// preserve positional alignment.
///
/// # Examples
/// ```
/// use scenarist_patterns::{compile_pattern, extract_captured_values};
///
/// let regex = compile_pattern("{count:u32} of {item:word}")?;
/// let values = extract_captured_values(&regex, "3 of widgets");
/// assert_eq!(values, Some(vec!["3".to_string(), "widgets".to_string()]));
/// assert_eq!(extract_captured_values(&regex, "many of widgets"), None);
/// # Ok::<(), scenarist_patterns::PatternError>(())
/// ```
#[must_use]
pub fn extract_captured_values(re: &Regex, text: &str) -> Option<Vec<String>> {
    let caps = re.captures(text)?;
    let values = caps
        .iter()
        .skip(1)
        .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
        .collect();
    Some(values)
}
