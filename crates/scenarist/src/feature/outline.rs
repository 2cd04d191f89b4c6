//! Scenario outline expansion.
//!
//! Each examples row materializes one scenario. `<name>` placeholders are
//! substituted literally in step text, data tables, and doc strings in a
//! single pass: values containing `<...>` are not re-expanded.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{ParseError, Scenario, ScenarioId, Step};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::expect_used, reason = "the pattern is a checked constant")]
    Regex::new(r"<([^>\s][^>]*)>").expect("placeholder regex is valid")
});

pub(super) fn expand(
    path: &str,
    scenario: &gherkin::Scenario,
    tags: &[String],
    steps: &[Step],
) -> Result<Vec<Scenario>, ParseError> {
    let mut expanded = Vec::new();
    let mut row_index = 0_usize;

    for examples in &scenario.examples {
        let Some(table) = examples.table.as_ref() else {
            continue;
        };
        let Some((header, rows)) = table.rows.split_first() else {
            continue;
        };
        let mut block_tags = tags.to_vec();
        for tag in &examples.tags {
            let tag = tag.trim_start_matches('@').to_string();
            if !block_tags.contains(&tag) {
                block_tags.push(tag);
            }
        }
        for row in rows {
            let values: HashMap<&str, &str> = header
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect();
            let steps = steps
                .iter()
                .map(|step| substitute_step(path, &scenario.name, step, header, &values))
                .collect::<Result<Vec<Step>, ParseError>>()?;
            expanded.push(Scenario {
                id: ScenarioId {
                    feature_path: path.to_string(),
                    line: scenario.position.line,
                    example_row: Some(row_index),
                },
                name: scenario.name.clone(),
                tags: block_tags.clone(),
                steps,
            });
            row_index += 1;
        }
    }

    if expanded.is_empty() {
        return Err(ParseError::MissingExamples {
            path: path.to_string(),
            scenario: scenario.name.clone(),
        });
    }
    Ok(expanded)
}

fn substitute_step(
    path: &str,
    scenario: &str,
    step: &Step,
    header: &[String],
    values: &HashMap<&str, &str>,
) -> Result<Step, ParseError> {
    let text = substitute(path, scenario, &step.text, header, values)?;
    let docstring = step
        .docstring
        .as_deref()
        .map(|doc| substitute(path, scenario, doc, header, values))
        .transpose()?;
    let table = step
        .table
        .as_ref()
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| substitute(path, scenario, cell, header, values))
                        .collect::<Result<Vec<String>, ParseError>>()
                })
                .collect::<Result<Vec<Vec<String>>, ParseError>>()
        })
        .transpose()?;
    Ok(Step {
        keyword: step.keyword,
        text,
        docstring,
        table,
    })
}

/// Replace every `<column>` reference in `text` with the row's value.
fn substitute(
    path: &str,
    scenario: &str,
    text: &str,
    header: &[String],
    values: &HashMap<&str, &str>,
) -> Result<String, ParseError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(text) {
        let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(value) = values.get(name.as_str()) else {
            return Err(ParseError::UnknownPlaceholder {
                path: path.to_string(),
                scenario: scenario.to_string(),
                placeholder: name.as_str().to_string(),
                columns: header.join(", "),
            });
        };
        out.push_str(text.get(last..token.start()).unwrap_or_default());
        out.push_str(value);
        last = token.end();
    }
    out.push_str(text.get(last..).unwrap_or_default());
    Ok(out)
}
