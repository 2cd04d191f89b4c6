//! Placeholder type-hint translation used during regex compilation.

const UNSIGNED: &str = r"\d+";
const SIGNED: &str = r"[+-]?\d+";
const FLOAT: &str = r"(?i:(?:[+-]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][+-]?\d+)?|nan|inf|infinity))";
const WORD: &str = r"\S+";
const QUOTED: &str = r#"[^"]*"#;
const FREE: &str = r".+?";

/// How a hint's capture group is embedded into the compiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HintClass {
    /// The fragment is the whole capture group.
    Plain(&'static str),
    /// The fragment is captured between literal double quotes, which stay
    /// outside the group so extracted values carry no quotes.
    Quoted(&'static str),
}

pub(crate) fn classify(hint: Option<&str>) -> HintClass {
    match hint {
        Some("u8" | "u16" | "u32" | "u64" | "u128" | "usize") => HintClass::Plain(UNSIGNED),
        Some("i8" | "i16" | "i32" | "i64" | "i128" | "isize") => HintClass::Plain(SIGNED),
        Some("f32" | "f64") => HintClass::Plain(FLOAT),
        Some("word") => HintClass::Plain(WORD),
        Some("string") => HintClass::Quoted(QUOTED),
        _ => HintClass::Plain(FREE),
    }
}

/// Translate a placeholder type hint into its capture-group fragment.
///
/// Unknown hints fall back to a lazy free-text match, so `{value:String}`
/// behaves like the bare `{value}`.
///
/// # Examples
/// ```
/// use scenarist_patterns::hint_fragment;
///
/// assert_eq!(hint_fragment(Some("u32")), r"\d+");
/// assert_eq!(hint_fragment(Some("word")), r"\S+");
/// assert_eq!(hint_fragment(None), r".+?");
/// ```
#[must_use]
pub fn hint_fragment(hint: Option<&str>) -> &'static str {
    match classify(hint) {
        HintClass::Plain(fragment) | HintClass::Quoted(fragment) => fragment,
    }
}
