//! Resolution of step text against registered definitions.

use scenarist_patterns::StepKeyword;

use crate::registry::{StepDefinition, StepRegistry};

/// Outcome of matching one step against the registry.
///
/// Matching considers every definition, so the outcome never depends on
/// registration order: zero matches is [`Undefined`](Self::Undefined), one is
/// [`Resolved`](Self::Resolved), and more than one is
/// [`Ambiguous`](Self::Ambiguous) with the conflicting pattern texts sorted.
#[derive(Debug)]
pub enum MatchOutcome<'a> {
    /// Exactly one definition matched the step text.
    Resolved {
        /// The matching definition.
        definition: &'a StepDefinition,
        /// Placeholder captures in pattern order.
        captures: Vec<String>,
    },
    /// No definition matched.
    Undefined,
    /// More than one definition matched.
    Ambiguous {
        /// Sorted pattern texts of every matching definition.
        patterns: Vec<String>,
    },
}

/// Match `text` against every definition registered for `keyword`.
///
/// `keyword` must already be resolved: a step written with `And`/`But`
/// matches definitions of the primary keyword it resolved to during parsing.
#[must_use]
pub fn match_step<'a>(
    registry: &'a StepRegistry,
    keyword: StepKeyword,
    text: &str,
) -> MatchOutcome<'a> {
    let mut matches: Vec<(&StepDefinition, Vec<String>)> = registry
        .definitions()
        .iter()
        .filter(|def| def.keyword() == keyword)
        .filter_map(|def| def.pattern().captures(text).map(|captures| (def, captures)))
        .collect();

    match matches.len() {
        0 => MatchOutcome::Undefined,
        1 => match matches.pop() {
            Some((definition, captures)) => MatchOutcome::Resolved {
                definition,
                captures,
            },
            None => MatchOutcome::Undefined,
        },
        _ => {
            let mut patterns: Vec<String> = matches
                .iter()
                .map(|(def, _)| def.pattern().as_str().to_string())
                .collect();
            patterns.sort();
            MatchOutcome::Ambiguous { patterns }
        }
    }
}
