//! Scenario execution: hooks, step resolution, and short-circuiting.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use crate::context::Context;
use crate::feature::{FeatureDocument, Scenario, Step};
use crate::hooks::Hooks;
use crate::matcher::{MatchOutcome, match_step};
use crate::panic::panic_message;
use crate::registry::{StepArgs, StepError, StepRegistry};
use crate::reporting::{
    FailureCause, ScenarioResult, ScenarioStatus, StepReport, StepStatus,
};

/// Execute one scenario against the registry, producing its result.
///
/// A fresh [`Context`] is created for the scenario; before-hooks run first,
/// then the feature's background steps, then the scenario's own steps, in
/// document order. The first step that fails, matches no definition, or
/// matches ambiguously stops execution and the remaining steps are recorded
/// as skipped without running. After-hooks always run; their errors are
/// recorded but never replace an earlier failure. Panics inside step actions
/// are caught and reported as step failures.
#[must_use]
pub fn execute_scenario(
    registry: &StepRegistry,
    hooks: &Hooks,
    feature: &FeatureDocument,
    scenario: &Scenario,
) -> ScenarioResult {
    let started = Instant::now();
    let mut ctx = Context::new();

    let mut hook_errors = hooks.run_before(&mut ctx);
    let mut failure = if hook_errors.is_empty() {
        None
    } else {
        Some(FailureCause::Hook {
            message: hook_errors.join("; "),
        })
    };

    let steps: Vec<&Step> = feature.background.iter().chain(&scenario.steps).collect();
    let mut reports = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        if failure.is_some() {
            reports.push(StepReport {
                keyword: step.keyword,
                text: step.text.clone(),
                status: StepStatus::Skipped,
                duration: Duration::ZERO,
                message: None,
            });
            continue;
        }
        reports.push(run_step(registry, &mut ctx, index, step, &mut failure));
    }

    let after_errors = hooks.run_after(&mut ctx);
    if failure.is_none() && !after_errors.is_empty() {
        failure = Some(FailureCause::Hook {
            message: after_errors.join("; "),
        });
    }
    hook_errors.extend(after_errors);

    let status = match &failure {
        None => ScenarioStatus::Passed,
        Some(FailureCause::Undefined { .. }) => ScenarioStatus::Undefined,
        Some(_) => ScenarioStatus::Failed,
    };
    log::debug!(
        "scenario '{}' ({}) finished: {}",
        scenario.name,
        scenario.id,
        status.label()
    );

    ScenarioResult {
        id: scenario.id.clone(),
        feature: feature.name.clone(),
        scenario: scenario.name.clone(),
        tags: scenario.tags.clone(),
        steps: reports,
        status,
        failure,
        hook_errors,
        duration: started.elapsed(),
    }
}

fn run_step(
    registry: &StepRegistry,
    ctx: &mut Context,
    index: usize,
    step: &Step,
    failure: &mut Option<FailureCause>,
) -> StepReport {
    let started = Instant::now();
    let (status, message) = match match_step(registry, step.keyword, &step.text) {
        MatchOutcome::Undefined => {
            *failure = Some(FailureCause::Undefined {
                index,
                text: step.text.clone(),
            });
            (
                StepStatus::Undefined,
                Some(format!(
                    "no step definition matches {} '{}'",
                    step.keyword, step.text
                )),
            )
        }
        MatchOutcome::Ambiguous { patterns } => {
            let message = format!(
                "ambiguous step '{}': matches {}",
                step.text,
                patterns.join(", ")
            );
            *failure = Some(FailureCause::Ambiguous {
                index,
                text: step.text.clone(),
                patterns,
            });
            (StepStatus::Failed, Some(message))
        }
        MatchOutcome::Resolved {
            definition,
            captures,
        } => {
            let args = StepArgs::new(
                &captures,
                step.docstring.as_deref(),
                step.table.as_deref(),
            );
            let outcome = catch_unwind(AssertUnwindSafe(|| definition.call(ctx, &args)));
            let result = match outcome {
                Ok(result) => result,
                Err(payload) => Err(StepError::new(panic_message(payload.as_ref()))),
            };
            match result {
                Ok(()) => (StepStatus::Passed, None),
                Err(err) => {
                    *failure = Some(FailureCause::Step {
                        index,
                        message: err.to_string(),
                    });
                    (StepStatus::Failed, Some(err.to_string()))
                }
            }
        }
    };

    StepReport {
        keyword: step.keyword,
        text: step.text.clone(),
        status,
        duration: started.elapsed(),
        message,
    }
}
