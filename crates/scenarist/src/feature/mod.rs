//! Feature document model and Gherkin parsing.
//!
//! Parsing delegates the grammar to the `gherkin` crate and maps its AST
//! into an immutable document model. `And`/`But` keywords are resolved
//! against the preceding primary keyword, feature tags are merged onto each
//! scenario, and Scenario Outlines are expanded eagerly: the model only ever
//! contains materialized scenarios.

use std::fmt;
use std::path::Path;

use gherkin::GherkinEnv;
use scenarist_patterns::StepKeyword;
use thiserror::Error;

mod outline;

/// Errors raised while loading a feature document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The feature file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the unreadable file.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The text is not valid Gherkin.
    #[error("{path}: {source}")]
    Gherkin {
        /// Path of the offending document.
        path: String,
        /// The parser diagnostic, including line information.
        #[source]
        source: gherkin::ParseError,
    },
    /// A scenario outline has no examples rows to expand.
    #[error("{path}: scenario outline '{scenario}' has no examples rows")]
    MissingExamples {
        /// Path of the offending document.
        path: String,
        /// Name of the outline.
        scenario: String,
    },
    /// An outline step references a column absent from the examples table.
    #[error(
        "{path}: placeholder '<{placeholder}>' in scenario '{scenario}' \
         is not an examples column (available: {columns})"
    )]
    UnknownPlaceholder {
        /// Path of the offending document.
        path: String,
        /// Name of the outline.
        scenario: String,
        /// The unresolved placeholder name.
        placeholder: String,
        /// Comma-separated list of available column names.
        columns: String,
    },
}

/// Stable identity of a materialized scenario.
///
/// The derived ordering (path, then line, then example row) gives consumers
/// a deterministic sort key for result streams produced by concurrent runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScenarioId {
    /// Path of the source feature document.
    pub feature_path: String,
    /// Line on which the scenario (or its outline) is declared.
    pub line: usize,
    /// Zero-based examples row for outline expansions.
    pub example_row: Option<usize>,
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.example_row {
            Some(row) => write!(f, "{}:{}#{row}", self.feature_path, self.line),
            None => write!(f, "{}:{}", self.feature_path, self.line),
        }
    }
}

/// A single step with its resolved keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Primary keyword class; `And`/`But` are resolved during parsing.
    pub keyword: StepKeyword,
    /// Literal step text without the keyword.
    pub text: String,
    /// Triple-quoted doc string attached to the step, if any.
    pub docstring: Option<String>,
    /// Data table rows attached to the step, if any.
    pub table: Option<Vec<Vec<String>>>,
}

/// A materialized scenario ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Stable identity used for sorting and reporting.
    pub id: ScenarioId,
    /// Scenario name as written in the document.
    pub name: String,
    /// Tags visible on the scenario: its own plus the feature's.
    pub tags: Vec<String>,
    /// Steps in document order, excluding background steps.
    pub steps: Vec<Step>,
}

/// An immutable, fully expanded feature document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDocument {
    /// Feature name.
    pub name: String,
    /// Source path, or the label passed to [`parse_feature_str`].
    pub path: String,
    /// Feature-level tags, without the leading `@`.
    pub tags: Vec<String>,
    /// Background steps run before every scenario.
    pub background: Vec<Step>,
    /// Materialized scenarios in document order.
    pub scenarios: Vec<Scenario>,
}

impl FeatureDocument {
    /// Render the document back to feature text.
    ///
    /// Expanded outlines are written as plain scenarios, so re-parsing the
    /// output yields the same scenario count, step order, and step counts.
    #[must_use]
    pub fn to_feature_text(&self) -> String {
        let mut out = String::new();
        write_tag_line(&mut out, "", &self.tags);
        out.push_str(&format!("Feature: {}\n", self.name));
        if !self.background.is_empty() {
            out.push_str("\n  Background:\n");
            write_steps(&mut out, &self.background);
        }
        for scenario in &self.scenarios {
            out.push('\n');
            let own_tags: Vec<String> = scenario
                .tags
                .iter()
                .filter(|tag| !self.tags.contains(tag))
                .cloned()
                .collect();
            write_tag_line(&mut out, "  ", &own_tags);
            out.push_str(&format!("  Scenario: {}\n", scenario.name));
            write_steps(&mut out, &scenario.steps);
        }
        out
    }
}

fn write_tag_line(out: &mut String, indent: &str, tags: &[String]) {
    if tags.is_empty() {
        return;
    }
    out.push_str(indent);
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push('@');
        out.push_str(tag);
    }
    out.push('\n');
}

fn write_steps(out: &mut String, steps: &[Step]) {
    for step in steps {
        out.push_str(&format!("    {} {}\n", step.keyword, step.text));
        if let Some(table) = &step.table {
            for row in table {
                out.push_str(&format!("      | {} |\n", row.join(" | ")));
            }
        }
        if let Some(docstring) = &step.docstring {
            out.push_str("      \"\"\"\n");
            for line in docstring.lines() {
                out.push_str(&format!("      {line}\n"));
            }
            out.push_str("      \"\"\"\n");
        }
    }
}

/// Parse feature text into a document, labelling errors with `path`.
///
/// # Errors
/// Returns [`ParseError`] when the text is not valid Gherkin or an outline
/// cannot be expanded.
pub fn parse_feature_str(
    source: &str,
    path: impl Into<String>,
) -> Result<FeatureDocument, ParseError> {
    let path = path.into();
    // gherkin rejects documents without a trailing newline.
    let mut text = source.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    let feature =
        gherkin::Feature::parse(&text, GherkinEnv::default()).map_err(|source| {
            ParseError::Gherkin {
                path: path.clone(),
                source,
            }
        })?;
    build_document(&feature, path)
}

/// Read and parse a feature file from disk.
///
/// # Errors
/// Returns [`ParseError`] when the file cannot be read or parsed.
pub fn parse_feature_file(path: &Path) -> Result<FeatureDocument, ParseError> {
    let label = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: label.clone(),
        source,
    })?;
    parse_feature_str(&text, label)
}

fn build_document(feature: &gherkin::Feature, path: String) -> Result<FeatureDocument, ParseError> {
    let tags = normalise_tags(&feature.tags);
    let background = feature
        .background
        .as_ref()
        .map(|bg| convert_steps(&bg.steps))
        .unwrap_or_default();

    let mut scenarios = Vec::new();
    for scenario in &feature.scenarios {
        let merged_tags = merge_tags(&tags, &scenario.tags);
        let steps = convert_steps(&scenario.steps);
        if scenario.examples.is_empty() {
            if is_outline_keyword(&scenario.keyword) {
                return Err(ParseError::MissingExamples {
                    path,
                    scenario: scenario.name.clone(),
                });
            }
            scenarios.push(Scenario {
                id: ScenarioId {
                    feature_path: path.clone(),
                    line: scenario.position.line,
                    example_row: None,
                },
                name: scenario.name.clone(),
                tags: merged_tags,
                steps,
            });
        } else {
            scenarios.extend(outline::expand(
                &path,
                scenario,
                &merged_tags,
                &steps,
            )?);
        }
    }

    log::debug!(
        "parsed {path}: {} scenario(s), {} background step(s)",
        scenarios.len(),
        background.len()
    );
    Ok(FeatureDocument {
        name: feature.name.clone(),
        path,
        tags,
        background,
        scenarios,
    })
}

fn is_outline_keyword(keyword: &str) -> bool {
    let keyword = keyword.trim();
    keyword.ends_with("Outline") || keyword.ends_with("Template")
}

fn normalise_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim_start_matches('@').to_string())
        .collect()
}

fn merge_tags(feature_tags: &[String], scenario_tags: &[String]) -> Vec<String> {
    let mut merged = feature_tags.to_vec();
    for tag in normalise_tags(scenario_tags) {
        if !merged.contains(&tag) {
            merged.push(tag);
        }
    }
    merged
}

fn convert_steps(steps: &[gherkin::Step]) -> Vec<Step> {
    let mut prev = None;
    steps
        .iter()
        .map(|step| Step {
            keyword: resolve_keyword(step, &mut prev),
            text: step.value.clone(),
            docstring: step.docstring.clone(),
            table: step.table.as_ref().map(|table| table.rows.clone()),
        })
        .collect()
}

/// Prefer the textual keyword so `And`/`But` can be resolved; fall back to
/// the parsed step type for localized keywords.
fn resolve_keyword(step: &gherkin::Step, prev: &mut Option<StepKeyword>) -> StepKeyword {
    let keyword = step
        .keyword
        .parse::<StepKeyword>()
        .ok()
        .or_else(|| StepKeyword::try_from(step.ty).ok())
        .unwrap_or(StepKeyword::Given);
    keyword.resolve(prev)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> FeatureDocument {
        parse_feature_str(source, "test.feature")
            .unwrap_or_else(|err| panic!("feature should parse: {err}"))
    }

    #[test]
    fn maps_feature_background_and_scenarios() {
        let doc = parse(
            "Feature: Login\n\
             \n\
             Background:\n\
               Given a clean session\n\
             \n\
             Scenario: Successful login\n\
               Given a registered user\n\
               When the user signs in\n\
               Then the dashboard is shown\n",
        );
        assert_eq!(doc.name, "Login");
        assert_eq!(doc.background.len(), 1);
        assert_eq!(doc.scenarios.len(), 1);
        let scenario = doc.scenarios.first().map(Clone::clone);
        let scenario = scenario.unwrap_or_else(|| panic!("scenario should exist"));
        assert_eq!(scenario.steps.len(), 3);
        assert_eq!(scenario.id.example_row, None);
    }

    #[test]
    fn resolves_and_but_to_preceding_primary_keyword() {
        let doc = parse(
            "Feature: Keywords\n\
             \n\
             Scenario: Conjunctions\n\
               Given a user\n\
               And a session\n\
               When the page loads\n\
               But the cache is cold\n\
               Then everything renders\n",
        );
        let keywords: Vec<StepKeyword> = doc
            .scenarios
            .iter()
            .flat_map(|s| s.steps.iter().map(|step| step.keyword))
            .collect();
        assert_eq!(
            keywords,
            vec![
                StepKeyword::Given,
                StepKeyword::Given,
                StepKeyword::When,
                StepKeyword::When,
                StepKeyword::Then,
            ]
        );
    }

    #[test]
    fn merges_feature_tags_onto_scenarios() {
        let doc = parse(
            "@suite\n\
             Feature: Tags\n\
             \n\
             @smoke\n\
             Scenario: Tagged\n\
               Given a user\n",
        );
        let tags = doc.scenarios.iter().flat_map(|s| s.tags.clone()).collect::<Vec<_>>();
        assert_eq!(tags, vec!["suite".to_string(), "smoke".to_string()]);
    }

    #[test]
    fn carries_docstrings_and_tables() {
        let doc = parse(
            "Feature: Attachments\n\
             \n\
             Scenario: With extras\n\
               Given the following users:\n\
                 | name  | role  |\n\
                 | alice | admin |\n\
               When the import runs with:\n\
                 \"\"\"\n\
                 dry-run: false\n\
                 \"\"\"\n\
               Then it succeeds\n",
        );
        let steps: Vec<Step> = doc.scenarios.iter().flat_map(|s| s.steps.clone()).collect();
        assert_eq!(
            steps.first().and_then(|s| s.table.as_ref()).map(Vec::len),
            Some(2)
        );
        assert!(
            steps
                .get(1)
                .and_then(|s| s.docstring.as_deref())
                .is_some_and(|d| d.contains("dry-run: false"))
        );
    }

    #[test]
    fn reports_gherkin_errors_with_path() {
        let err = match parse_feature_str("not gherkin at all", "broken.feature") {
            Err(err) => err,
            Ok(doc) => panic!("unexpectedly parsed {doc:?}"),
        };
        assert!(matches!(err, ParseError::Gherkin { .. }));
        assert!(err.to_string().contains("broken.feature"));
    }

    #[test]
    fn round_trips_through_feature_text() {
        let original = parse(
            "@suite\n\
             Feature: Round trip\n\
             \n\
             Background:\n\
               Given a clean slate\n\
             \n\
             @smoke\n\
             Scenario: First\n\
               Given a user\n\
               When something happens\n\
               Then it worked\n\
             \n\
             Scenario: Second\n\
               Given another user\n\
               Then it still works\n",
        );
        let reparsed = parse(&original.to_feature_text());
        assert_eq!(reparsed.scenarios.len(), original.scenarios.len());
        assert_eq!(reparsed.background, original.background);
        for (a, b) in reparsed.scenarios.iter().zip(&original.scenarios) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.steps, b.steps);
            assert_eq!(a.tags, b.tags);
        }
    }
}
