//! Result model and pluggable reporters.
//!
//! Results are pushed to reporters as an append-only stream: each completed
//! scenario is delivered once via [`Reporter::scenario_finished`], in
//! completion order, followed by a single [`Reporter::run_finished`] call.
//! Multiple subscribers each observe the complete stream. Consumers needing
//! document order can sort by [`ScenarioId`](crate::ScenarioId).

use std::fmt;
use std::time::Duration;

use scenarist_patterns::StepKeyword;

use crate::feature::ScenarioId;

mod console;
#[cfg(feature = "json-report")]
mod json;

pub use console::ConsoleReporter;
#[cfg(feature = "json-report")]
pub use json::JsonReporter;

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step's action returned `Ok`.
    Passed,
    /// The action returned an error, panicked, or matched ambiguously.
    Failed,
    /// An earlier failure prevented the step from executing.
    Skipped,
    /// No step definition matched.
    Undefined,
}

impl StepStatus {
    /// Lowercase label used by reporters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Undefined => "undefined",
        }
    }
}

/// Outcome of a whole scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioStatus {
    /// Every step passed and no hook failed.
    Passed,
    /// A step failed, a hook failed, a match was ambiguous, or time ran out.
    Failed,
    /// A step had no matching definition.
    Undefined,
}

impl ScenarioStatus {
    /// Lowercase label used by reporters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Undefined => "undefined",
        }
    }
}

/// The first failure that decided a scenario's status.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FailureCause {
    /// A step action returned an error or panicked.
    Step {
        /// Index of the step within the executed sequence.
        index: usize,
        /// The failure message.
        message: String,
    },
    /// A step had no matching definition.
    Undefined {
        /// Index of the step within the executed sequence.
        index: usize,
        /// The unmatched step text.
        text: String,
    },
    /// More than one definition matched a step.
    Ambiguous {
        /// Index of the step within the executed sequence.
        index: usize,
        /// The ambiguous step text.
        text: String,
        /// Sorted pattern texts of every matching definition.
        patterns: Vec<String>,
    },
    /// A before- or after-hook failed.
    Hook {
        /// Combined hook error message.
        message: String,
    },
    /// The scenario exceeded its time budget.
    TimedOut {
        /// The configured budget.
        limit: Duration,
    },
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step { index, message } => write!(f, "step {index} failed: {message}"),
            Self::Undefined { index, text } => {
                write!(f, "step {index} has no matching definition: '{text}'")
            }
            Self::Ambiguous {
                index,
                text,
                patterns,
            } => write!(
                f,
                "step {index} '{text}' matches {} definitions: {}",
                patterns.len(),
                patterns.join(", ")
            ),
            Self::Hook { message } => write!(f, "hook failed: {message}"),
            Self::TimedOut { limit } => {
                write!(f, "scenario exceeded its {}ms budget", limit.as_millis())
            }
        }
    }
}

/// Per-step record within a scenario result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Resolved keyword of the step.
    pub keyword: StepKeyword,
    /// Step text as executed (outline placeholders already substituted).
    pub text: String,
    /// Outcome of the step.
    pub status: StepStatus,
    /// Wall-clock execution time; zero for skipped steps.
    pub duration: Duration,
    /// Failure or diagnostic message, when there is one.
    pub message: Option<String>,
}

/// Complete record of one executed scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioResult {
    /// Stable identity of the scenario.
    pub id: ScenarioId,
    /// Feature name.
    pub feature: String,
    /// Scenario name.
    pub scenario: String,
    /// Tags visible on the scenario.
    pub tags: Vec<String>,
    /// Step records in execution order (background steps first).
    pub steps: Vec<StepReport>,
    /// Overall outcome.
    pub status: ScenarioStatus,
    /// The first failure, when the scenario did not pass.
    pub failure: Option<FailureCause>,
    /// Errors raised by hooks; never masks `failure`.
    pub hook_errors: Vec<String>,
    /// Total wall-clock time including hooks.
    pub duration: Duration,
}

impl ScenarioResult {
    /// True when the scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// Aggregated outcome of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Results in completion order.
    pub results: Vec<ScenarioResult>,
    /// True when a stop token fired before every scenario was scheduled.
    pub stopped: bool,
}

impl RunSummary {
    /// True when every executed scenario passed and the run was not stopped.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.stopped && self.results.iter().all(ScenarioResult::passed)
    }

    /// Number of passed scenarios.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    /// Number of failed scenarios.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    /// Number of scenarios with undefined steps.
    #[must_use]
    pub fn undefined(&self) -> usize {
        self.count(ScenarioStatus::Undefined)
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// Subscriber to the result stream of a run.
///
/// Implementations must be `Send + Sync`: concurrent runs call
/// [`scenario_finished`](Self::scenario_finished) from the coordinating
/// thread, but the trait keeps the door open for reporter sharing.
pub trait Reporter: Send + Sync {
    /// Called once per completed scenario, in completion order.
    fn scenario_finished(&self, result: &ScenarioResult);

    /// Called once after the last scenario.
    fn run_finished(&self, _summary: &RunSummary) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: ScenarioStatus) -> ScenarioResult {
        ScenarioResult {
            id: ScenarioId {
                feature_path: "f.feature".into(),
                line: 3,
                example_row: None,
            },
            feature: "Feature".into(),
            scenario: "Scenario".into(),
            tags: Vec::new(),
            steps: Vec::new(),
            status,
            failure: None,
            hook_errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn summary_counts_by_status() {
        let summary = RunSummary {
            results: vec![
                result(ScenarioStatus::Passed),
                result(ScenarioStatus::Failed),
                result(ScenarioStatus::Undefined),
                result(ScenarioStatus::Passed),
            ],
            stopped: false,
        };
        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.undefined(), 1);
        assert!(!summary.all_passed());
    }

    #[test]
    fn stopped_runs_never_count_as_fully_passed() {
        let summary = RunSummary {
            results: vec![result(ScenarioStatus::Passed)],
            stopped: true,
        };
        assert!(!summary.all_passed());
    }

    #[test]
    fn failure_cause_display_names_conflicting_patterns() {
        let cause = FailureCause::Ambiguous {
            index: 1,
            text: "alice logs in".into(),
            patterns: vec!["{name:word} logs in".into(), "{name} logs in".into()],
        };
        let message = cause.to_string();
        assert!(message.contains("{name:word} logs in"));
        assert!(message.contains("{name} logs in"));
        assert!(message.contains("2 definitions"));
    }
}
