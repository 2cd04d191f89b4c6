//! NDJSON reporter: one JSON object per scenario, then a summary object.
//!
//! The stream is append-only and keeps status labels lowercase so downstream
//! tools can rely on consistent casing. Durations are reported in
//! milliseconds.

use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;

use super::{Reporter, RunSummary, ScenarioResult, StepReport};

#[derive(Serialize)]
struct JsonScenario<'a> {
    feature_path: &'a str,
    feature: &'a str,
    scenario: &'a str,
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    example_row: Option<usize>,
    status: &'static str,
    duration_ms: u128,
    tags: &'a [String],
    steps: Vec<JsonStep<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "slice_is_empty")]
    hook_errors: &'a [String],
}

fn slice_is_empty(slice: &&[String]) -> bool {
    slice.is_empty()
}

#[derive(Serialize)]
struct JsonStep<'a> {
    keyword: &'static str,
    text: &'a str,
    status: &'static str,
    duration_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonSummary {
    summary: JsonCounts,
}

#[derive(Serialize)]
struct JsonCounts {
    scenarios: usize,
    passed: usize,
    failed: usize,
    undefined: usize,
    stopped: bool,
}

impl<'a> From<&'a ScenarioResult> for JsonScenario<'a> {
    fn from(result: &'a ScenarioResult) -> Self {
        Self {
            feature_path: &result.id.feature_path,
            feature: &result.feature,
            scenario: &result.scenario,
            line: result.id.line,
            example_row: result.id.example_row,
            status: result.status.label(),
            duration_ms: result.duration.as_millis(),
            tags: &result.tags,
            steps: result.steps.iter().map(JsonStep::from).collect(),
            error: result.failure.as_ref().map(ToString::to_string),
            hook_errors: &result.hook_errors,
        }
    }
}

impl<'a> From<&'a StepReport> for JsonStep<'a> {
    fn from(step: &'a StepReport) -> Self {
        Self {
            keyword: step.keyword.as_str(),
            text: &step.text,
            status: step.status.label(),
            duration_ms: step.duration.as_millis(),
            message: step.message.as_deref(),
        }
    }
}

impl From<&RunSummary> for JsonSummary {
    fn from(summary: &RunSummary) -> Self {
        Self {
            summary: JsonCounts {
                scenarios: summary.results.len(),
                passed: summary.passed(),
                failed: summary.failed(),
                undefined: summary.undefined(),
                stopped: summary.stopped,
            },
        }
    }
}

/// Serialize one scenario result as a JSON string.
///
/// # Errors
/// Returns an error when serialization fails.
pub fn scenario_to_string(result: &ScenarioResult) -> serde_json::Result<String> {
    serde_json::to_string(&JsonScenario::from(result))
}

/// Machine-readable reporter emitting newline-delimited JSON.
pub struct JsonReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonReporter<W> {
    /// Reporter writing NDJSON to the given sink.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write_line(&self, line: &str) {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writeln!(out, "{line}") {
            log::warn!("json reporter write failed: {err}");
        }
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn scenario_finished(&self, result: &ScenarioResult) {
        match scenario_to_string(result) {
            Ok(line) => self.write_line(&line),
            Err(err) => log::warn!("json reporter serialization failed: {err}"),
        }
    }

    fn run_finished(&self, summary: &RunSummary) {
        match serde_json::to_string(&JsonSummary::from(summary)) {
            Ok(line) => self.write_line(&line),
            Err(err) => log::warn!("json reporter serialization failed: {err}"),
        }
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = out.flush() {
            log::warn!("json reporter flush failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::feature::ScenarioId;
    use crate::reporting::{FailureCause, ScenarioStatus, StepStatus};
    use scenarist_patterns::StepKeyword;

    fn sample() -> ScenarioResult {
        ScenarioResult {
            id: ScenarioId {
                feature_path: "login.feature".into(),
                line: 4,
                example_row: Some(1),
            },
            feature: "Login".into(),
            scenario: "Locked account".into(),
            tags: vec!["auth".into()],
            steps: vec![StepReport {
                keyword: StepKeyword::When,
                text: "bob signs in".into(),
                status: StepStatus::Undefined,
                duration: Duration::ZERO,
                message: Some("no step definition matches When 'bob signs in'".into()),
            }],
            status: ScenarioStatus::Undefined,
            failure: Some(FailureCause::Undefined {
                index: 0,
                text: "bob signs in".into(),
            }),
            hook_errors: Vec::new(),
            duration: Duration::from_millis(7),
        }
    }

    #[test]
    fn serializes_lowercase_labels_and_identity() {
        let line = scenario_to_string(&sample())
            .unwrap_or_else(|err| panic!("serialization should succeed: {err}"));
        assert!(line.contains("\"status\":\"undefined\""));
        assert!(line.contains("\"feature_path\":\"login.feature\""));
        assert!(line.contains("\"example_row\":1"));
        assert!(line.contains("\"duration_ms\":7"));
    }

    #[test]
    fn reporter_emits_one_line_per_scenario_plus_summary() {
        let mut buf = Vec::new();
        {
            let reporter = JsonReporter::new(&mut buf);
            reporter.scenario_finished(&sample());
            reporter.run_finished(&RunSummary {
                results: vec![sample()],
                stopped: false,
            });
        }
        let output = String::from_utf8_lossy(&buf);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.first().is_some_and(|l| l.starts_with('{')));
        assert!(
            lines
                .last()
                .is_some_and(|l| l.contains("\"undefined\":1") && l.contains("\"stopped\":false"))
        );
    }
}
